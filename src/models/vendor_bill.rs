use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::entities::vendor_bill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorBill {
    pub id: String,
    pub rfq_id: String,
    pub vendor_id: String,
    pub bill_date: String,
    pub payment: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<vendor_bill::Model> for VendorBill {
    fn from(row: vendor_bill::Model) -> Self {
        Self {
            id: row.id_bill,
            rfq_id: row.id_rfq,
            vendor_id: row.id_vendor,
            bill_date: row.bill_date,
            payment: row.payment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorBillInput {
    pub bill_date: String,
    pub payment: String,
}
