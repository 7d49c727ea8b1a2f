use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{budget_item, input, product_service};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::product_service::{
    CreateProductServiceRequest, ProductServiceResponse, UpdateProductServiceRequest,
    validate_create_product_service, validate_update_product_service,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Products & Services",
    operation_id = "createProductService",
    summary = "Create a catalog entry",
    request_body = CreateProductServiceRequest,
    responses(
        (status = 201, description = "Entry created", body = ProductServiceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Name already used by this user (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_product_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_product_service(&payload)?;

    let name = payload.name.trim().to_string();
    ensure_name_free(&state.db, auth_user.user_id, &name, None).await?;

    let now = chrono::Utc::now();
    let new_entry = product_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(auth_user.user_id),
        name: Set(name),
        description: Set(payload.description),
        kind: Set(payload.kind),
        base_price: Set(payload.base_price),
        estimated_time_hours: Set(payload.estimated_time_hours),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_entry.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ProductServiceResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Products & Services",
    operation_id = "listProductServices",
    summary = "List the current user's catalog, alphabetically",
    responses(
        (status = 200, description = "Catalog entries", body = Vec<ProductServiceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_product_services(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductServiceResponse>>, AppError> {
    let entries = product_service::Entity::find()
        .filter(product_service::Column::UserId.eq(auth_user.user_id))
        .order_by_asc(product_service::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(
        entries.into_iter().map(ProductServiceResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products & Services",
    operation_id = "getProductService",
    summary = "Get one catalog entry by ID",
    params(("id" = Uuid, Path, description = "Catalog entry ID")),
    responses(
        (status = 200, description = "Entry details", body = ProductServiceResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_product_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ProductServiceResponse>, AppError> {
    let model = find_owned_product_service(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products & Services",
    operation_id = "updateProductService",
    summary = "Partially update a catalog entry",
    description = "Only provided fields are modified; an empty payload returns the resource unchanged.",
    params(("id" = Uuid, Path, description = "Catalog entry ID")),
    request_body = UpdateProductServiceRequest,
    responses(
        (status = 200, description = "Entry updated", body = ProductServiceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used by this user (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_product_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProductServiceRequest>,
) -> Result<Json<ProductServiceResponse>, AppError> {
    validate_update_product_service(&payload)?;

    if payload == UpdateProductServiceRequest::default() {
        let existing = find_owned_product_service(&state.db, id, auth_user.user_id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_owned_product_service(&txn, id, auth_user.user_id).await?;

    if let Some(ref name) = payload.name {
        let name = name.trim();
        if name != existing.name {
            ensure_name_free(&txn, auth_user.user_id, name, Some(existing.id)).await?;
        }
    }

    let mut active: product_service::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind);
    }
    if let Some(base_price) = payload.base_price {
        active.base_price = Set(base_price);
    }
    if let Some(hours) = payload.estimated_time_hours {
        active.estimated_time_hours = Set(hours);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products & Services",
    operation_id = "deleteProductService",
    summary = "Delete a catalog entry",
    description = "Deletes the entry and its inputs. Budget items that referenced it survive with their prices intact; only the link is cleared.",
    params(("id" = Uuid, Path, description = "Catalog entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_product_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let entry = find_owned_product_service(&txn, id, auth_user.user_id).await?;

    input::Entity::delete_many()
        .filter(input::Column::ProductServiceId.eq(entry.id))
        .exec(&txn)
        .await?;

    // Detach referencing budget lines instead of deleting them; their
    // captured prices stay, so budget totals do not move.
    budget_item::Entity::update_many()
        .col_expr(
            budget_item::Column::ProductServiceId,
            Expr::value(sea_orm::Value::Uuid(None)),
        )
        .filter(budget_item::Column::ProductServiceId.eq(entry.id))
        .exec(&txn)
        .await?;

    product_service::Entity::delete_by_id(entry.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_owned_product_service<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<product_service::Model, AppError> {
    product_service::Entity::find_by_id(id)
        .filter(product_service::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product/service not found".into()))
}

/// Per-owner name uniqueness. `exclude` skips the row being renamed.
async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let mut query = product_service::Entity::find()
        .filter(product_service::Column::UserId.eq(user_id))
        .filter(product_service::Column::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(product_service::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(
            "A product/service with this name already exists".into(),
        ));
    }
    Ok(())
}
