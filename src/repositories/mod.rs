//! Header and line-item persistence. Functions are generic over
//! `ConnectionTrait` so the same query runs on the pool or inside a
//! document's transaction.

use sea_orm::DbErr;
use std::collections::HashMap;
use tracing::error;

use crate::errors::ServiceError;

pub mod bom;
pub mod catalog;
pub mod manufacturing_order;
pub mod quotation;
pub mod rfq;
pub mod vendor_bill;

pub use bom::{BomMaterialStore, BomRepository};
pub use catalog::{Catalog, CatalogEntity, CatalogPrice, CatalogRepository};
pub use manufacturing_order::ManufacturingOrderRepository;
pub use quotation::{QuotationProductStore, QuotationRepository};
pub use rfq::{RfqProductStore, RfqRepository};
pub use vendor_bill::VendorBillRepository;

/// Logs a storage failure with what was being attempted and wraps it.
pub(crate) fn storage_error(action: &'static str) -> impl Fn(DbErr) -> ServiceError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        ServiceError::db_error(e)
    }
}

/// Groups line-item rows under the id of the document owning them.
pub(crate) fn group_by_document<T, F>(rows: Vec<T>, document_id: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        grouped
            .entry(document_id(&row).to_string())
            .or_default()
            .push(row);
    }
    grouped
}

/// Offset and limit of a list page (1-based page numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    offset: u64,
}

impl PageRequest {
    /// Rejects pages whose offset does not fit a signed 64-bit SQL offset.
    pub fn new(page: u64, page_size: u64) -> Result<Self, ServiceError> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("page {} is out of range", page))
            })?;

        Ok(Self {
            page,
            page_size,
            offset,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}
