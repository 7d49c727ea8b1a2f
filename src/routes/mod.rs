use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/productservices", product_service_routes())
        .nest("/inputs", input_routes())
        .nest("/budgets", budget_routes())
        .nest("/budgetitems", budget_item_routes())
        .nest("/ai", ai_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::profile))
}

fn product_service_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product_service::create_product_service,
            handlers::product_service::list_product_services
        ))
        .routes(routes!(
            handlers::product_service::get_product_service,
            handlers::product_service::update_product_service,
            handlers::product_service::delete_product_service
        ))
}

fn input_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::input::create_input))
        .routes(routes!(handlers::input::list_inputs))
        .routes(routes!(
            handlers::input::get_input,
            handlers::input::update_input,
            handlers::input::delete_input
        ))
}

fn budget_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::budget::create_budget,
            handlers::budget::list_budgets
        ))
        .routes(routes!(
            handlers::budget::get_budget,
            handlers::budget::update_budget,
            handlers::budget::delete_budget
        ))
        .routes(routes!(handlers::pdf::export_budget_pdf))
}

fn budget_item_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::budget_item::create_budget_item))
        .routes(routes!(handlers::budget_item::list_budget_items))
        .routes(routes!(
            handlers::budget_item::get_budget_item,
            handlers::budget_item::update_budget_item,
            handlers::budget_item::delete_budget_item
        ))
}

fn ai_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::ai::generate_budget_items))
}
