use std::collections::HashMap;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{budget_item, product_service, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::path::AppPath;
use crate::pdf::render_budget;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/pdf",
    tag = "Budgets",
    operation_id = "exportBudgetPdf",
    summary = "Export a budget as a PDF document",
    params(("id" = Uuid, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Absent or owned by another user (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn export_budget_pdf(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let budget = super::budget::find_owned_budget(&state.db, id, auth_user.user_id).await?;

    let owner = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let items = budget_item::Entity::find()
        .filter(budget_item::Column::BudgetId.eq(budget.id))
        .order_by_asc(budget_item::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let ids: Vec<Uuid> = items.iter().filter_map(|i| i.product_service_id).collect();
    let catalog: HashMap<Uuid, product_service::Model> = if ids.is_empty() {
        HashMap::new()
    } else {
        product_service::Entity::find()
            .filter(product_service::Column::Id.is_in(ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|ps| (ps.id, ps))
            .collect()
    };

    let bytes = render_budget(&owner, &budget, &items, &catalog)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    let disposition = format!("attachment; filename=\"budget-{}.pdf\"", budget.id);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Internal(format!("Header error: {e}")))?,
    );

    Ok((headers, bytes))
}
