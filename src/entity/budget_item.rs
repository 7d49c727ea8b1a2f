use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One priced line within a budget. Ownership is transitive through the
/// parent budget; there is no user_id column here.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub budget_id: Uuid,
    #[sea_orm(belongs_to, from = "budget_id", to = "id")]
    pub budget: HasOne<super::budget::Entity>,

    /// NULL for ad hoc lines not tied to a catalog entry.
    pub product_service_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "product_service_id", to = "id")]
    pub product_service: Option<super::product_service::Entity>,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_price: Decimal,
    /// Expected to equal quantity x unit_price; accepted from the client
    /// unless `budget.recompute_item_totals` is enabled.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_item_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub estimated_time_hours: Option<Decimal>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
