use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::priced_line::{PricedLine, PricedLineInput};
use crate::documents::status::Status;
use crate::entities::{rfq, rfq_product};
use crate::errors::ServiceError;

/// Request for quotation sent to a vendor. Lines reference materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rfq {
    pub id: String,
    pub vendor_id: String,
    pub order_date: String,
    pub status: Status,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub products: Vec<PricedLine>,
}

impl Rfq {
    pub(crate) fn hydrate(
        header: rfq::Model,
        products: Vec<rfq_product::Model>,
    ) -> Result<Self, ServiceError> {
        let products = products
            .into_iter()
            .map(PricedLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: header.id_rfq,
            vendor_id: header.id_vendor,
            order_date: header.order_date,
            status: Status::from_persisted(header.status),
            created_at: header.created_at,
            updated_at: header.updated_at,
            products,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfqInput {
    pub vendor_id: String,
    pub order_date: String,
    pub products: Vec<PricedLineInput>,
}
