use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;
use tracing::error;

use crate::documents::money;
use crate::entities::{customer, material, product, vendor};
use crate::errors::ServiceError;

/// Catalog entities documents refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CatalogEntity {
    Product,
    Material,
    Vendor,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPrice {
    pub sell_price: Decimal,
    pub make_price: Decimal,
}

/// Read-only lookups into the product/material/vendor/customer catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn exists(&self, entity: CatalogEntity, id: &str) -> Result<bool, ServiceError>;

    /// Prices of a product or material
    async fn price_of(&self, entity: CatalogEntity, id: &str)
        -> Result<CatalogPrice, ServiceError>;

    async fn name_of(&self, entity: CatalogEntity, id: &str) -> Result<String, ServiceError>;
}

pub fn missing(entity: CatalogEntity, id: &str) -> ServiceError {
    ServiceError::NotFound(format!("{} with id {} does not exist", entity, id))
}

/// Fails with not-found naming the id when the entity is absent.
pub async fn require<C: Catalog + ?Sized>(
    catalog: &C,
    entity: CatalogEntity,
    id: &str,
) -> Result<(), ServiceError> {
    if catalog.exists(entity, id).await? {
        Ok(())
    } else {
        Err(missing(entity, id))
    }
}

/// Catalog backed by the catalog tables
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn count(&self, entity: CatalogEntity, id: &str) -> Result<u64, sea_orm::DbErr> {
        let db = &*self.db;
        match entity {
            CatalogEntity::Product => {
                product::Entity::find()
                    .filter(product::Column::IdProduct.eq(id))
                    .count(db)
                    .await
            }
            CatalogEntity::Material => {
                material::Entity::find()
                    .filter(material::Column::IdMaterial.eq(id))
                    .count(db)
                    .await
            }
            CatalogEntity::Vendor => {
                vendor::Entity::find()
                    .filter(vendor::Column::IdVendor.eq(id))
                    .count(db)
                    .await
            }
            CatalogEntity::Customer => {
                customer::Entity::find()
                    .filter(customer::Column::IdCustomer.eq(id))
                    .count(db)
                    .await
            }
        }
    }
}

fn lookup_failed(entity: CatalogEntity, e: sea_orm::DbErr) -> ServiceError {
    error!("Catalog lookup of {} failed: {}", entity, e);
    ServiceError::db_error(e)
}

#[async_trait]
impl Catalog for CatalogRepository {
    async fn exists(&self, entity: CatalogEntity, id: &str) -> Result<bool, ServiceError> {
        let count = self
            .count(entity, id)
            .await
            .map_err(|e| lookup_failed(entity, e))?;
        Ok(count > 0)
    }

    async fn price_of(
        &self,
        entity: CatalogEntity,
        id: &str,
    ) -> Result<CatalogPrice, ServiceError> {
        let db = &*self.db;
        let (sell, make) = match entity {
            CatalogEntity::Product => product::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|p| (p.sales_price, p.cost)),
            CatalogEntity::Material => material::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|m| (m.sales_price, m.cost)),
            CatalogEntity::Vendor | CatalogEntity::Customer => {
                return Err(ServiceError::ValidationError(format!(
                    "{} entries carry no price",
                    entity
                )))
            }
        }
        .ok_or_else(|| missing(entity, id))?;

        Ok(CatalogPrice {
            sell_price: money::parse_persisted_or_zero(id, "sales_price", &sell)?,
            make_price: money::parse_persisted_or_zero(id, "cost", &make)?,
        })
    }

    async fn name_of(&self, entity: CatalogEntity, id: &str) -> Result<String, ServiceError> {
        let db = &*self.db;
        let name = match entity {
            CatalogEntity::Product => product::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|p| p.product_name),
            CatalogEntity::Material => material::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|m| m.material_name),
            CatalogEntity::Vendor => vendor::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|v| v.vendor_name),
            CatalogEntity::Customer => customer::Entity::find_by_id(id.to_string())
                .one(db)
                .await
                .map_err(|e| lookup_failed(entity, e))?
                .map(|c| c.customer_name),
        };

        name.ok_or_else(|| missing(entity, id))
    }
}
