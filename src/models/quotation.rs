use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::priced_line::{PricedLine, PricedLineInput};
use crate::documents::status::Status;
use crate::entities::{quotation, quotation_product};
use crate::errors::ServiceError;

/// Sales quotation offered to a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,
    pub customer_id: String,
    pub order_date: String,
    pub status: Status,
    pub payment: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub products: Vec<PricedLine>,
}

impl Quotation {
    pub(crate) fn hydrate(
        header: quotation::Model,
        products: Vec<quotation_product::Model>,
    ) -> Result<Self, ServiceError> {
        let products = products
            .into_iter()
            .map(PricedLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: header.id_quotation,
            customer_id: header.id_customer,
            order_date: header.order_date,
            status: Status::from_persisted(header.status),
            payment: header.payment,
            created_at: header.created_at,
            updated_at: header.updated_at,
            products,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotationInput {
    pub customer_id: String,
    pub order_date: String,
    pub payment: Option<String>,
    pub products: Vec<PricedLineInput>,
}
