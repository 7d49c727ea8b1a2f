use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::budget_item;
use crate::entity::product_service::ServiceKind;
use crate::error::AppError;

use super::shared::{double_option, money, validate_name, validate_non_negative};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBudgetItemRequest {
    pub budget_id: Uuid,
    /// Kept as a string so the legacy `"null"` sentinel and malformed UUIDs
    /// can be told apart (absent vs 400).
    pub product_service_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_item_price: Decimal,
    pub estimated_time_hours: Option<Decimal>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateBudgetItemRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_item_price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_time_hours: Option<Option<Decimal>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetItemResponse {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub product_service_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_item_price: Decimal,
    pub estimated_time_hours: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized view of the linked catalog entry, for display.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CatalogSummary {
    pub name: String,
    pub kind: ServiceKind,
    pub base_price: Option<Decimal>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetItemListEntry {
    #[serde(flatten)]
    pub item: BudgetItemResponse,
    pub product_service: Option<CatalogSummary>,
}

/// Create/update responses carry the freshly recomputed parent total so the
/// client never has to re-fetch the budget.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetItemMutationResponse {
    pub budget_item: BudgetItemResponse,
    pub updated_budget_total: Decimal,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetItemDeleteResponse {
    pub updated_budget_total: Decimal,
}

impl From<budget_item::Model> for BudgetItemResponse {
    fn from(m: budget_item::Model) -> Self {
        Self {
            id: m.id,
            budget_id: m.budget_id,
            product_service_id: m.product_service_id,
            name: m.name,
            description: m.description,
            quantity: m.quantity,
            unit_price: money(m.unit_price),
            total_item_price: money(m.total_item_price),
            estimated_time_hours: m.estimated_time_hours,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Resolve the optional catalog reference from its wire form.
///
/// Absent, empty and the literal string `"null"` all mean "ad hoc line";
/// anything else must parse as a UUID.
pub fn parse_product_service_ref(raw: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match raw {
        None | Some("") | Some("null") => Ok(None),
        Some(value) => Uuid::parse_str(value).map(Some).map_err(|_| {
            AppError::Validation("product_service_id is not a valid UUID".into())
        }),
    }
}

pub fn validate_create_budget_item(req: &CreateBudgetItemRequest) -> Result<(), AppError> {
    validate_name(&req.name, "name")?;
    validate_non_negative(req.quantity, "quantity")?;
    validate_non_negative(req.total_item_price, "total_item_price")?;
    if let Some(hours) = req.estimated_time_hours {
        validate_non_negative(hours, "estimated_time_hours")?;
    }
    Ok(())
}

pub fn validate_update_budget_item(req: &UpdateBudgetItemRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "name")?;
    }
    if let Some(quantity) = req.quantity {
        validate_non_negative(quantity, "quantity")?;
    }
    if let Some(total) = req.total_item_price {
        validate_non_negative(total, "total_item_price")?;
    }
    if let Some(Some(hours)) = req.estimated_time_hours {
        validate_non_negative(hours, "estimated_time_hours")?;
    }
    Ok(())
}
