use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{input, product_service};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::input::{
    CreateInputRequest, InputResponse, UpdateInputRequest, validate_create_input,
    validate_update_input,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Inputs",
    operation_id = "createInput",
    summary = "Add a cost component to a catalog entry",
    request_body = CreateInputRequest,
    responses(
        (status = 201, description = "Input created", body = InputResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Catalog entry absent or foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(product_service_id = %payload.product_service_id))]
pub async fn create_input(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInputRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_input(&payload)?;

    let parent = super::product_service::find_owned_product_service(
        &state.db,
        payload.product_service_id,
        auth_user.user_id,
    )
    .await?;

    let now = chrono::Utc::now();
    let new_input = input::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_service_id: Set(parent.id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        quantity: Set(payload.quantity.unwrap_or(Decimal::ONE)),
        unit: Set(payload.unit),
        cost_per_unit: Set(payload.cost_per_unit),
        supplier_suggestion: Set(payload.supplier_suggestion),
        supplier_link: Set(payload.supplier_link),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_input.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(InputResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{productServiceId}",
    tag = "Inputs",
    operation_id = "listInputs",
    summary = "List a catalog entry's inputs, oldest first",
    params(("productServiceId" = Uuid, Path, description = "Catalog entry ID")),
    responses(
        (status = 200, description = "Inputs of the entry", body = Vec<InputResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Catalog entry absent or foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(product_service_id = %product_service_id))]
pub async fn list_inputs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(product_service_id): AppPath<Uuid>,
) -> Result<Json<Vec<InputResponse>>, AppError> {
    let parent = super::product_service::find_owned_product_service(
        &state.db,
        product_service_id,
        auth_user.user_id,
    )
    .await?;

    let inputs = input::Entity::find()
        .filter(input::Column::ProductServiceId.eq(parent.id))
        .order_by_asc(input::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(inputs.into_iter().map(InputResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/single/{id}",
    tag = "Inputs",
    operation_id = "getInput",
    summary = "Get a single input by ID",
    params(("id" = Uuid, Path, description = "Input ID")),
    responses(
        (status = 200, description = "Input details", body = InputResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Input absent or parent entry foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_input(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<InputResponse>, AppError> {
    let model = find_owned_input(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/single/{id}",
    tag = "Inputs",
    operation_id = "updateInput",
    summary = "Partially update an input",
    description = "Only provided fields are modified; an empty payload returns the resource unchanged.",
    params(("id" = Uuid, Path, description = "Input ID")),
    request_body = UpdateInputRequest,
    responses(
        (status = 200, description = "Input updated", body = InputResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Input absent or parent entry foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_input(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateInputRequest>,
) -> Result<Json<InputResponse>, AppError> {
    validate_update_input(&payload)?;

    if payload == UpdateInputRequest::default() {
        let existing = find_owned_input(&state.db, id, auth_user.user_id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_owned_input(&txn, id, auth_user.user_id).await?;
    let mut active: input::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(cost_per_unit) = payload.cost_per_unit {
        active.cost_per_unit = Set(cost_per_unit);
    }
    if let Some(supplier_suggestion) = payload.supplier_suggestion {
        active.supplier_suggestion = Set(supplier_suggestion);
    }
    if let Some(supplier_link) = payload.supplier_link {
        active.supplier_link = Set(supplier_link);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/single/{id}",
    tag = "Inputs",
    operation_id = "deleteInput",
    summary = "Delete an input",
    params(("id" = Uuid, Path, description = "Input ID")),
    responses(
        (status = 204, description = "Input deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Input absent or parent entry foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_input(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let input = find_owned_input(&state.db, id, auth_user.user_id).await?;
    input::Entity::delete_by_id(input.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ownership runs through the parent catalog entry: the input exists for the
/// caller only if its product/service belongs to them.
async fn find_owned_input<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<input::Model, AppError> {
    let input = input::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Input not found".into()))?;

    product_service::Entity::find_by_id(input.product_service_id)
        .filter(product_service::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Input not found".into()))?;

    Ok(input)
}
