use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::documents::{money, rollup::CostRollup, status::Status, DocumentKind};
use crate::documents::rollup::CostLine;

/// Catalog prices of the document's subject, where it has any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDetails {
    pub id: String,
    pub name: String,
    pub sell_price: Decimal,
    pub make_price: Decimal,
}

/// Read-only cost projection of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOverview {
    pub id: String,
    pub kind: DocumentKind,
    /// Product, vendor or customer the document is about
    pub subject_id: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_details: Option<PriceDetails>,
    pub lines: Vec<CostLine>,
    pub total_cost: Decimal,
    pub display_total: String,
}

impl DocumentOverview {
    pub(crate) fn new(
        kind: DocumentKind,
        id: String,
        subject_id: String,
        status: Status,
        rollup: CostRollup,
    ) -> Self {
        Self {
            id,
            kind,
            subject_id,
            status,
            order_date: None,
            subject_details: None,
            display_total: money::display_rupiah(rollup.total),
            total_cost: rollup.total,
            lines: rollup.lines,
        }
    }

    pub(crate) fn with_order_date(mut self, order_date: String) -> Self {
        self.order_date = Some(order_date);
        self
    }

    pub(crate) fn with_subject_details(mut self, details: PriceDetails) -> Self {
        self.subject_details = Some(details);
        self
    }
}
