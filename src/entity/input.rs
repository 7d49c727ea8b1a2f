use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cost component (material, sub-cost) of a catalog entry. Purely
/// descriptive; totals never roll up from inputs to the parent price.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "input")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_service_id: Uuid,
    #[sea_orm(belongs_to, from = "product_service_id", to = "id")]
    pub product_service: HasOne<super::product_service::Entity>,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub quantity: Decimal,
    /// Unit of measure, e.g. "kg", "meter", "unit", "liter".
    pub unit: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub cost_per_unit: Option<Decimal>,

    pub supplier_suggestion: Option<String>,
    pub supplier_link: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
