use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{budget, budget_item, product_service};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::budget_item::*;
use crate::models::shared::money;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Budget Items",
    operation_id = "createBudgetItem",
    summary = "Add a line item to a budget",
    description = "Creates a line item and recomputes the parent budget's total in the same transaction, under a lock on the budget row.",
    request_body = CreateBudgetItemRequest,
    responses(
        (status = 201, description = "Item created; response carries the recomputed total", body = BudgetItemMutationResponse),
        (status = 400, description = "Validation error, e.g. malformed product_service_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Budget or catalog entry absent / foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(budget_id = %payload.budget_id))]
pub async fn create_budget_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBudgetItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_budget_item(&payload)?;
    let catalog_ref = parse_product_service_ref(payload.product_service_id.as_deref())?;

    let txn = state.db.begin().await?;

    let budget = find_budget_for_update(&txn, payload.budget_id, auth_user.user_id).await?;

    if let Some(ps_id) = catalog_ref {
        super::product_service::find_owned_product_service(&txn, ps_id, auth_user.user_id)
            .await?;
    }

    let total_item_price = if state.config.budget.recompute_item_totals {
        payload.quantity * payload.unit_price
    } else {
        payload.total_item_price
    };

    let now = chrono::Utc::now();
    let new_item = budget_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        budget_id: Set(budget.id),
        product_service_id: Set(catalog_ref),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        quantity: Set(money(payload.quantity)),
        unit_price: Set(money(payload.unit_price)),
        total_item_price: Set(money(total_item_price)),
        estimated_time_hours: Set(payload.estimated_time_hours),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_item.insert(&txn).await?;
    let updated_total = recompute_budget_total(&txn, budget.id).await?;

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BudgetItemMutationResponse {
            budget_item: model.into(),
            updated_budget_total: updated_total,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{budgetId}",
    tag = "Budget Items",
    operation_id = "listBudgetItems",
    summary = "List a budget's items, oldest first",
    description = "Each entry includes a denormalized summary of the linked catalog entry when one exists.",
    params(("budgetId" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Items of the budget", body = Vec<BudgetItemListEntry>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Budget absent or foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(budget_id = %budget_id))]
pub async fn list_budget_items(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(budget_id): AppPath<Uuid>,
) -> Result<Json<Vec<BudgetItemListEntry>>, AppError> {
    let budget = super::budget::find_owned_budget(&state.db, budget_id, auth_user.user_id).await?;

    let items = budget_item::Entity::find()
        .filter(budget_item::Column::BudgetId.eq(budget.id))
        .order_by_asc(budget_item::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let catalog = load_catalog_summaries(&state.db, &items).await?;

    let entries = items
        .into_iter()
        .map(|item| {
            let product_service = item
                .product_service_id
                .and_then(|id| catalog.get(&id))
                .map(|ps| CatalogSummary {
                    name: ps.name.clone(),
                    kind: ps.kind,
                    base_price: ps.base_price.map(money),
                });
            BudgetItemListEntry {
                item: item.into(),
                product_service,
            }
        })
        .collect();

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/single/{id}",
    tag = "Budget Items",
    operation_id = "getBudgetItem",
    summary = "Get a single budget item by ID",
    params(("id" = Uuid, Path, description = "Budget item ID")),
    responses(
        (status = 200, description = "Item details", body = BudgetItemResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Item absent or parent budget foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_budget_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BudgetItemResponse>, AppError> {
    let (item, _) = find_owned_item(&state.db, id, auth_user.user_id).await?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    put,
    path = "/single/{id}",
    tag = "Budget Items",
    operation_id = "updateBudgetItem",
    summary = "Partially update a budget item",
    description = "Only provided fields are modified. The parent budget's total is recomputed in the same transaction, under a lock on the budget row.",
    params(("id" = Uuid, Path, description = "Budget item ID")),
    request_body = UpdateBudgetItemRequest,
    responses(
        (status = 200, description = "Item updated; response carries the recomputed total", body = BudgetItemMutationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Item absent or parent budget foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_budget_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateBudgetItemRequest>,
) -> Result<Json<BudgetItemMutationResponse>, AppError> {
    validate_update_budget_item(&payload)?;

    if payload == UpdateBudgetItemRequest::default() {
        let (item, parent) = find_owned_item(&state.db, id, auth_user.user_id).await?;
        return Ok(Json(BudgetItemMutationResponse {
            budget_item: item.into(),
            updated_budget_total: money(parent.total_value),
        }));
    }

    let txn = state.db.begin().await?;

    let (item, budget) = find_owned_item_for_update(&txn, id, auth_user.user_id).await?;

    let effective_quantity = payload.quantity.unwrap_or(item.quantity);
    let effective_unit_price = payload.unit_price.unwrap_or(item.unit_price);

    let mut active: budget_item::ActiveModel = item.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(money(quantity));
    }
    if let Some(unit_price) = payload.unit_price {
        active.unit_price = Set(money(unit_price));
    }
    if let Some(total) = payload.total_item_price {
        active.total_item_price = Set(money(total));
    }
    if let Some(hours) = payload.estimated_time_hours {
        active.estimated_time_hours = Set(hours);
    }
    if state.config.budget.recompute_item_totals {
        active.total_item_price = Set(money(effective_quantity * effective_unit_price));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    let updated_total = recompute_budget_total(&txn, budget.id).await?;

    txn.commit().await?;

    Ok(Json(BudgetItemMutationResponse {
        budget_item: model.into(),
        updated_budget_total: updated_total,
    }))
}

#[utoipa::path(
    delete,
    path = "/single/{id}",
    tag = "Budget Items",
    operation_id = "deleteBudgetItem",
    summary = "Delete a budget item",
    description = "Removes the line and recomputes the parent budget's total in the same transaction.",
    params(("id" = Uuid, Path, description = "Budget item ID")),
    responses(
        (status = 200, description = "Item deleted; response carries the recomputed total", body = BudgetItemDeleteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Item absent or parent budget foreign (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_budget_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BudgetItemDeleteResponse>, AppError> {
    let txn = state.db.begin().await?;

    let (item, budget) = find_owned_item_for_update(&txn, id, auth_user.user_id).await?;

    budget_item::Entity::delete_by_id(item.id).exec(&txn).await?;
    let updated_total = recompute_budget_total(&txn, budget.id).await?;

    txn.commit().await?;

    Ok(Json(BudgetItemDeleteResponse {
        updated_budget_total: updated_total,
    }))
}

/// Resolve the parent budget scoped to the acting user, locking the row for
/// the rest of the transaction. The lock serializes concurrent item
/// mutations on the same budget, so at most one recomputation is in flight
/// per budget at a time.
async fn find_budget_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
    user_id: Uuid,
) -> Result<budget::Model, AppError> {
    budget::Entity::find_by_id(id)
        .filter(budget::Column::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget not found".into()))
}

/// Resolve an item together with its parent budget, requiring the parent to
/// belong to the acting user. Ownership failures are indistinguishable from
/// absence.
async fn find_owned_item<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<(budget_item::Model, budget::Model), AppError> {
    let item = budget_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget item not found".into()))?;

    let parent = budget::Entity::find_by_id(item.budget_id)
        .filter(budget::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget item not found".into()))?;

    Ok((item, parent))
}

/// Resolve an item for a write: lock its parent budget first, then re-read
/// the item under the lock. A sibling transaction that deleted the item
/// while we waited on the lock therefore surfaces as absence, not as a
/// failed row update.
async fn find_owned_item_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
    user_id: Uuid,
) -> Result<(budget_item::Model, budget::Model), AppError> {
    let (item, parent) = find_owned_item(txn, id, user_id).await?;
    let budget = find_budget_for_update(txn, parent.id, user_id).await?;

    let item = budget_item::Entity::find_by_id(item.id)
        .filter(budget_item::Column::BudgetId.eq(budget.id))
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget item not found".into()))?;

    Ok((item, budget))
}

/// The total consistency engine: re-sum every surviving sibling and store
/// the result on the parent. Always a full re-sum, never an incremental
/// delta, so the stored total self-heals no matter which path mutated the
/// item set.
async fn recompute_budget_total(
    txn: &DatabaseTransaction,
    budget_id: Uuid,
) -> Result<Decimal, AppError> {
    let prices: Vec<Decimal> = budget_item::Entity::find()
        .filter(budget_item::Column::BudgetId.eq(budget_id))
        .select_only()
        .column(budget_item::Column::TotalItemPrice)
        .into_tuple::<Decimal>()
        .all(txn)
        .await?;

    let total = money(prices.into_iter().sum());

    budget::Entity::update_many()
        .col_expr(budget::Column::TotalValue, Expr::value(total))
        .col_expr(budget::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(budget::Column::Id.eq(budget_id))
        .exec(txn)
        .await?;

    Ok(total)
}

async fn load_catalog_summaries<C: ConnectionTrait>(
    db: &C,
    items: &[budget_item::Model],
) -> Result<HashMap<Uuid, product_service::Model>, AppError> {
    let ids: Vec<Uuid> = items.iter().filter_map(|i| i.product_service_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_service::Entity::find()
        .filter(product_service::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|ps| (ps.id, ps)).collect())
}
