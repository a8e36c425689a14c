use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rfqs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_rfq: String,
    pub id_vendor: String,
    pub order_date: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rfq_product::Entity")]
    Products,
    #[sea_orm(has_many = "super::vendor_bill::Entity")]
    Bills,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::IdVendor",
        to = "super::vendor::Column::IdVendor"
    )]
    Vendor,
}

impl Related<super::rfq_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::vendor_bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
