use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product. Prices are decimal strings.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_product: String,
    pub product_name: String,
    pub reference: Option<String>,
    pub sales_price: String,
    /// Make price
    pub cost: String,
    pub tax: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
