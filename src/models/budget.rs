use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::budget::{self, BudgetStatus};
use crate::error::AppError;

use super::shared::{double_option, money, validate_email, validate_name};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBudgetRequest {
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub status: Option<BudgetStatus>,
    pub notes: Option<String>,
    pub has_watermark: Option<bool>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateBudgetRequest {
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub client_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub client_phone: Option<Option<String>>,
    /// Accepted as an override for compatibility; the item lifecycle remains
    /// authoritative and overwrites it on the next item mutation.
    pub total_value: Option<Decimal>,
    pub status: Option<BudgetStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub has_watermark: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub total_value: Decimal,
    pub status: BudgetStatus,
    pub notes: Option<String>,
    pub has_watermark: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<budget::Model> for BudgetResponse {
    fn from(m: budget::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            client_name: m.client_name,
            client_email: m.client_email,
            client_phone: m.client_phone,
            total_value: money(m.total_value),
            status: m.status,
            notes: m.notes,
            has_watermark: m.has_watermark,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_budget(req: &CreateBudgetRequest) -> Result<(), AppError> {
    validate_name(&req.client_name, "client_name")?;
    if let Some(ref email) = req.client_email {
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_update_budget(req: &UpdateBudgetRequest) -> Result<(), AppError> {
    if let Some(ref client_name) = req.client_name {
        validate_name(client_name, "client_name")?;
    }
    if let Some(Some(ref email)) = req.client_email {
        validate_email(email)?;
    }
    Ok(())
}
