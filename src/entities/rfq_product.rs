use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// RFQ line. `id_product` references a material: vendors supply materials.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rfq_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_rfq_product: String,
    pub id_rfq: String,
    pub id_product: String,
    pub id_vendor: String,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub tax: String,
    pub subtotal: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rfq::Entity",
        from = "Column::IdRfq",
        to = "super::rfq::Column::IdRfq"
    )]
    Rfq,
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::IdProduct",
        to = "super::material::Column::IdMaterial"
    )]
    Material,
}

impl Related<super::rfq::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rfq.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
