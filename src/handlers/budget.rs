use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{budget, budget_item};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::budget::{
    BudgetResponse, CreateBudgetRequest, UpdateBudgetRequest, validate_create_budget,
    validate_update_budget,
};
use crate::models::shared::money;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Budgets",
    operation_id = "createBudget",
    summary = "Create a new budget",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_budget(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBudgetRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_budget(&payload)?;

    let now = chrono::Utc::now();
    let new_budget = budget::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(auth_user.user_id),
        client_name: Set(payload.client_name.trim().to_string()),
        client_email: Set(payload.client_email),
        client_phone: Set(payload.client_phone),
        total_value: Set(money(Decimal::ZERO)),
        status: Set(payload.status.unwrap_or_default()),
        notes: Set(payload.notes),
        has_watermark: Set(payload.has_watermark.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_budget.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(BudgetResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Budgets",
    operation_id = "listBudgets",
    summary = "List the current user's budgets, newest first",
    responses(
        (status = 200, description = "List of budgets", body = Vec<BudgetResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_budgets(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BudgetResponse>>, AppError> {
    let budgets = budget::Entity::find()
        .filter(budget::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(budget::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(budgets.into_iter().map(BudgetResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Budgets",
    operation_id = "getBudget",
    summary = "Get one of the current user's budgets by ID",
    params(("id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget details", body = BudgetResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_budget(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BudgetResponse>, AppError> {
    let model = find_owned_budget(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Budgets",
    operation_id = "updateBudget",
    summary = "Partially update a budget",
    description = "Only provided fields are modified; an empty payload returns the resource unchanged. A total_value override is accepted for compatibility but the item lifecycle stays authoritative.",
    params(("id" = Uuid, Path, description = "Budget ID")),
    request_body = UpdateBudgetRequest,
    responses(
        (status = 200, description = "Budget updated", body = BudgetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_budget(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateBudgetRequest>,
) -> Result<Json<BudgetResponse>, AppError> {
    validate_update_budget(&payload)?;

    if payload == UpdateBudgetRequest::default() {
        let existing = find_owned_budget(&state.db, id, auth_user.user_id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_owned_budget(&txn, id, auth_user.user_id).await?;
    let mut active: budget::ActiveModel = existing.into();

    if let Some(ref client_name) = payload.client_name {
        active.client_name = Set(client_name.trim().to_string());
    }
    if let Some(client_email) = payload.client_email {
        active.client_email = Set(client_email);
    }
    if let Some(client_phone) = payload.client_phone {
        active.client_phone = Set(client_phone);
    }
    if let Some(total_value) = payload.total_value {
        active.total_value = Set(money(total_value));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(notes);
    }
    if let Some(has_watermark) = payload.has_watermark {
        active.has_watermark = Set(has_watermark);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Budgets",
    operation_id = "deleteBudget",
    summary = "Delete a budget and all its items",
    params(("id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 204, description = "Budget deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_budget(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let budget = find_owned_budget(&txn, id, auth_user.user_id).await?;

    budget_item::Entity::delete_many()
        .filter(budget_item::Column::BudgetId.eq(budget.id))
        .exec(&txn)
        .await?;
    budget::Entity::delete_by_id(budget.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch-and-authorize in one query: the row must exist AND belong to the
/// acting user; both failures collapse into the same `NotFound`.
pub async fn find_owned_budget<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<budget::Model, AppError> {
    budget::Entity::find_by_id(id)
        .filter(budget::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget not found".into()))
}
