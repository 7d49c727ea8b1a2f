use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::product_service::{self, ServiceKind};
use crate::error::AppError;

use super::shared::{double_option, validate_name, validate_non_negative};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProductServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: ServiceKind,
    pub base_price: Option<Decimal>,
    pub estimated_time_hours: Option<Decimal>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProductServiceRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub kind: Option<ServiceKind>,
    #[serde(default, deserialize_with = "double_option")]
    pub base_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_time_hours: Option<Option<Decimal>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductServiceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: ServiceKind,
    pub base_price: Option<Decimal>,
    pub estimated_time_hours: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product_service::Model> for ProductServiceResponse {
    fn from(m: product_service::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            description: m.description,
            kind: m.kind,
            base_price: m.base_price.map(super::shared::money),
            estimated_time_hours: m.estimated_time_hours,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_product_service(
    req: &CreateProductServiceRequest,
) -> Result<(), AppError> {
    validate_name(&req.name, "name")?;
    if let Some(price) = req.base_price {
        validate_non_negative(price, "base_price")?;
    }
    if let Some(hours) = req.estimated_time_hours {
        validate_non_negative(hours, "estimated_time_hours")?;
    }
    Ok(())
}

pub fn validate_update_product_service(
    req: &UpdateProductServiceRequest,
) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "name")?;
    }
    if let Some(Some(price)) = req.base_price {
        validate_non_negative(price, "base_price")?;
    }
    if let Some(Some(hours)) = req.estimated_time_hours {
        validate_non_negative(hours, "estimated_time_hours")?;
    }
    Ok(())
}
