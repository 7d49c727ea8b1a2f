use axum::{Json, extract::State};
use tracing::instrument;
use uuid::Uuid;

use crate::ai::{build_prompt, parse_suggestions};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::ai::{
    GenerateSuggestionsRequest, GenerateSuggestionsResponse, validate_generate_request,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/generate-budget-items",
    tag = "AI",
    operation_id = "generateBudgetItems",
    summary = "Generate candidate line items for a budget",
    description = "Asks the text-generation upstream for a plausible item breakdown. Suggestions are advisory; nothing is persisted.",
    request_body = GenerateSuggestionsRequest,
    responses(
        (status = 200, description = "Candidate items", body = GenerateSuggestionsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Budget absent or foreign (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Upstream replied in an unusable shape; raw text attached (UPSTREAM_FORMAT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(budget_id = %payload.budget_id))]
pub async fn generate_budget_items(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenerateSuggestionsRequest>,
) -> Result<Json<GenerateSuggestionsResponse>, AppError> {
    validate_generate_request(&payload)?;

    let budget =
        super::budget::find_owned_budget(&state.db, payload.budget_id, auth_user.user_id).await?;

    let prompt = build_prompt(&payload);
    let raw = state.suggestions.complete(&prompt).await?;
    let mut suggestions = parse_suggestions(&raw)?;

    for item in &mut suggestions {
        item.budget_id = Some(budget.id);
        if item.product_service_id.is_none() {
            item.product_service_id = Some(Uuid::new_v4().to_string());
        }
    }

    tracing::info!(count = suggestions.len(), "Generated budget item suggestions");

    Ok(Json(GenerateSuggestionsResponse {
        budget_id: budget.id,
        suggestions,
    }))
}
