//! Document services: one per document kind, each orchestrating id minting,
//! status tables, line-item reconciliation, and cost rollup over the
//! repositories.

pub mod bom;
pub mod manufacturing_order;
pub mod quotation;
pub mod rfq;
pub mod vendor_bill;

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::cache::{CacheBackend, CacheInvalidationPolicy, PageCache};
use crate::config::{CacheConfig, DocumentsConfig};
use crate::db::DbPool;
use crate::documents::DocumentKind;
use crate::errors::ServiceError;
use crate::repositories::catalog::{self, Catalog, CatalogEntity};
use crate::repositories::PageRequest;

pub use bom::BomService;
pub use manufacturing_order::ManufacturingOrderService;
pub use quotation::QuotationService;
pub use rfq::RfqService;
pub use vendor_bill::VendorBillService;

/// Collaborators every document service needs
#[derive(Clone)]
pub struct DocumentContext {
    pub db: Arc<DbPool>,
    pub catalog: Arc<dyn Catalog>,
    pub pages: PageCache,
    pub invalidation: CacheInvalidationPolicy,
    pub settings: DocumentsConfig,
}

impl DocumentContext {
    pub fn new(
        db: Arc<DbPool>,
        catalog: Arc<dyn Catalog>,
        cache: Arc<dyn CacheBackend>,
        cache_config: &CacheConfig,
        settings: DocumentsConfig,
    ) -> Self {
        Self {
            pages: PageCache::new(cache.clone(), cache_config.ttl()),
            invalidation: CacheInvalidationPolicy::new(cache),
            db,
            catalog,
            settings,
        }
    }

    pub fn page_request(&self, page: u64) -> Result<PageRequest, ServiceError> {
        PageRequest::new(page, self.settings.list_page_size)
    }

    pub(crate) async fn invalidate(&self, kind: DocumentKind) {
        self.invalidation.invalidate(kind).await;
    }

    /// Name snapshot for a line or header. A caller-supplied name wins, but
    /// the referenced entity must exist either way.
    pub(crate) async fn snapshot_name(
        &self,
        entity: CatalogEntity,
        id: &str,
        given: Option<String>,
    ) -> Result<String, ServiceError> {
        match given.filter(|name| !name.trim().is_empty()) {
            Some(name) => {
                catalog::require(self.catalog.as_ref(), entity, id).await?;
                Ok(name)
            }
            None => self.catalog.name_of(entity, id).await,
        }
    }
}

/// Catalog sell price shown next to a line. An entry that has since left
/// the catalog shows no price rather than failing the overview.
pub(crate) async fn informational_price(
    catalog: &dyn Catalog,
    entity: CatalogEntity,
    id: &str,
) -> Result<Option<Decimal>, ServiceError> {
    match catalog.price_of(entity, id).await {
        Ok(price) => Ok(Some(price.sell_price)),
        Err(ServiceError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// All document services, built from one context
#[derive(Clone)]
pub struct AppServices {
    pub boms: Arc<BomService>,
    pub manufacturing_orders: Arc<ManufacturingOrderService>,
    pub rfqs: Arc<RfqService>,
    pub quotations: Arc<QuotationService>,
    pub vendor_bills: Arc<VendorBillService>,
}

impl AppServices {
    pub fn new(ctx: DocumentContext) -> Self {
        Self {
            boms: Arc::new(BomService::new(ctx.clone())),
            manufacturing_orders: Arc::new(ManufacturingOrderService::new(ctx.clone())),
            rfqs: Arc::new(RfqService::new(ctx.clone())),
            quotations: Arc::new(QuotationService::new(ctx.clone())),
            vendor_bills: Arc::new(VendorBillService::new(ctx)),
        }
    }
}
