use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::documents::{money, reconcile::LineItem, status::Status};
use crate::entities::{bom, bom_material};
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_reference: Option<String>,
    pub quantity: Decimal,
    pub status: Status,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub materials: Vec<BomMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomMaterial {
    pub id: String,
    pub material_id: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
}

impl TryFrom<bom_material::Model> for BomMaterial {
    type Error = ServiceError;

    fn try_from(row: bom_material::Model) -> Result<Self, Self::Error> {
        let quantity = money::parse_persisted(&row.id_bom_material, "quantity", &row.quantity)?;
        Ok(Self {
            id: row.id_bom_material,
            material_id: row.id_material,
            material_name: row.material_name,
            quantity,
            unit: row.unit,
        })
    }
}

impl Bom {
    pub(crate) fn hydrate(
        header: bom::Model,
        materials: Vec<bom_material::Model>,
    ) -> Result<Self, ServiceError> {
        let quantity = money::parse_persisted(&header.id_bom, "quantity", &header.quantity)?;
        let materials = materials
            .into_iter()
            .map(BomMaterial::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: header.id_bom,
            product_id: header.id_product,
            product_name: header.product_name,
            product_reference: header.product_reference,
            quantity,
            status: Status::from_persisted(header.status),
            created_at: header.created_at,
            updated_at: header.updated_at,
            materials,
        })
    }
}

/// Header fields and materials of a BOM create or update
#[derive(Debug, Clone, PartialEq)]
pub struct BomInput {
    pub product_id: String,
    /// Snapshot of the product name; taken from the catalog when absent
    pub product_name: Option<String>,
    pub product_reference: Option<String>,
    pub quantity: Decimal,
    pub materials: Vec<BomMaterialInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BomMaterialInput {
    pub material_id: String,
    pub material_name: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
}

impl LineItem for BomMaterialInput {
    fn catalog_id(&self) -> &str {
        &self.material_id
    }
}
