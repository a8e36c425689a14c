use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_bom_material: String,
    pub id_bom: String,
    pub id_material: String,
    pub material_name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bom::Entity",
        from = "Column::IdBom",
        to = "super::bom::Column::IdBom"
    )]
    Bom,
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::IdMaterial",
        to = "super::material::Column::IdMaterial"
    )]
    Material,
}

impl Related<super::bom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bom.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
