use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GenerateSuggestionsRequest {
    pub budget_id: Uuid,
    pub project_description: String,
    pub service_type: String,
    pub estimated_total_value: Decimal,
}

/// One candidate line item as produced by the text-generation upstream.
/// Advisory only; never persisted as-is.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuggestedItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub estimated_time_hours: Option<Decimal>,
    pub total_item_price: Decimal,
    /// Placeholder reference; filled with a fresh UUID when the model omits it.
    #[serde(default)]
    pub product_service_id: Option<String>,
    /// Stamped server-side; the model never sees real budget IDs.
    #[serde(default)]
    pub budget_id: Option<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GenerateSuggestionsResponse {
    pub budget_id: Uuid,
    pub suggestions: Vec<SuggestedItem>,
}

pub fn validate_generate_request(req: &GenerateSuggestionsRequest) -> Result<(), AppError> {
    if req.project_description.trim().is_empty() {
        return Err(AppError::Validation("project_description is required".into()));
    }
    if req.service_type.trim().is_empty() {
        return Err(AppError::Validation("service_type is required".into()));
    }
    if req.estimated_total_value <= Decimal::ZERO {
        return Err(AppError::Validation(
            "estimated_total_value must be positive".into(),
        ));
    }
    Ok(())
}
