use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::input;
use crate::error::AppError;

use super::shared::{double_option, validate_name, validate_non_negative, validate_url};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateInputRequest {
    pub product_service_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_suggestion: Option<String>,
    pub supplier_link: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateInputRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost_per_unit: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_suggestion: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_link: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InputResponse {
    pub id: Uuid,
    pub product_service_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_suggestion: Option<String>,
    pub supplier_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<input::Model> for InputResponse {
    fn from(m: input::Model) -> Self {
        Self {
            id: m.id,
            product_service_id: m.product_service_id,
            name: m.name,
            description: m.description,
            quantity: m.quantity,
            unit: m.unit,
            cost_per_unit: m.cost_per_unit.map(super::shared::money),
            supplier_suggestion: m.supplier_suggestion,
            supplier_link: m.supplier_link,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_input(req: &CreateInputRequest) -> Result<(), AppError> {
    validate_name(&req.name, "name")?;
    if let Some(quantity) = req.quantity {
        validate_non_negative(quantity, "quantity")?;
    }
    if let Some(cost) = req.cost_per_unit {
        validate_non_negative(cost, "cost_per_unit")?;
    }
    if let Some(ref link) = req.supplier_link {
        validate_url(link)?;
    }
    Ok(())
}

pub fn validate_update_input(req: &UpdateInputRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "name")?;
    }
    if let Some(quantity) = req.quantity {
        validate_non_negative(quantity, "quantity")?;
    }
    if let Some(Some(cost)) = req.cost_per_unit {
        validate_non_negative(cost, "cost_per_unit")?;
    }
    if let Some(Some(ref link)) = req.supplier_link {
        validate_url(link)?;
    }
    Ok(())
}
