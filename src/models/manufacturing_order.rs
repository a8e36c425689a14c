use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::documents::{money, status::Status};
use crate::entities::manufacturing_order;
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingOrder {
    pub id: String,
    pub product_id: String,
    pub bom_id: String,
    pub qty_to_produce: Decimal,
    pub status: Status,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl TryFrom<manufacturing_order::Model> for ManufacturingOrder {
    type Error = ServiceError;

    fn try_from(row: manufacturing_order::Model) -> Result<Self, Self::Error> {
        let qty_to_produce =
            money::parse_persisted(&row.id_mo, "qty_to_produce", &row.qty_to_produce)?;
        Ok(Self {
            id: row.id_mo,
            product_id: row.id_product,
            bom_id: row.id_bom,
            qty_to_produce,
            status: Status::from_persisted(row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturingOrderInput {
    pub product_id: String,
    pub bom_id: String,
    pub qty_to_produce: Decimal,
}

/// Header changes allowed after creation. Status is not among them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManufacturingOrderPatch {
    pub bom_id: Option<String>,
    pub qty_to_produce: Option<Decimal>,
}
