use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{group_by_document, storage_error, PageRequest};
use crate::documents::money;
use crate::documents::reconcile::{LineItemStore, PersistedItem};
use crate::documents::sequence::IdPrefix;
use crate::documents::status::Status;
use crate::entities::{rfq, rfq_product, vendor_bill};
use crate::errors::ServiceError;
use crate::models::{PricedLineInput, Rfq, RfqInput};

pub struct RfqRepository;

impl RfqRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<rfq::Model>, ServiceError> {
        rfq::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .map_err(storage_error("load RFQ"))
    }

    pub async fn find_hydrated<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<Rfq>, ServiceError> {
        let Some(header) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let products = rfq_product::Entity::find()
            .filter(rfq_product::Column::IdRfq.eq(id))
            .order_by_asc(rfq_product::Column::IdRfqProduct)
            .all(db)
            .await
            .map_err(storage_error("load RFQ products"))?;

        Rfq::hydrate(header, products).map(Some)
    }

    pub async fn last_id<C: ConnectionTrait>(db: &C) -> Result<Option<String>, ServiceError> {
        rfq::Entity::find()
            .select_only()
            .column(rfq::Column::IdRfq)
            .order_by_desc(rfq::Column::IdRfq)
            .into_tuple::<String>()
            .one(db)
            .await
            .map_err(storage_error("read last RFQ id"))
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        id: &str,
        input: &RfqInput,
        status: &Status,
    ) -> Result<rfq::Model, ServiceError> {
        let now = Utc::now();
        rfq::ActiveModel {
            id_rfq: Set(id.to_string()),
            id_vendor: Set(input.vendor_id.clone()),
            order_date: Set(input.order_date.clone()),
            status: Set(status.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(storage_error("insert RFQ"))
    }

    pub async fn update_header<C: ConnectionTrait>(
        db: &C,
        existing: rfq::Model,
        input: &RfqInput,
    ) -> Result<rfq::Model, ServiceError> {
        let mut active: rfq::ActiveModel = existing.into();
        active.id_vendor = Set(input.vendor_id.clone());
        active.order_date = Set(input.order_date.clone());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update RFQ"))
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        existing: rfq::Model,
        status: &Status,
    ) -> Result<rfq::Model, ServiceError> {
        let mut active: rfq::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update RFQ status"))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, ServiceError> {
        rfq::Entity::delete_by_id(id.to_string())
            .exec(db)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete RFQ"))
    }

    /// A page of RFQs, restricted to `statuses` unless it is empty.
    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        statuses: &[&str],
        page: PageRequest,
    ) -> Result<Vec<Rfq>, ServiceError> {
        let mut filter = Condition::all();
        if !statuses.is_empty() {
            filter = filter.add(rfq::Column::Status.is_in(statuses.iter().copied()));
        }

        let headers = rfq::Entity::find()
            .filter(filter)
            .order_by_asc(rfq::Column::IdRfq)
            .offset(page.offset())
            .limit(page.page_size)
            .all(db)
            .await
            .map_err(storage_error("list RFQs"))?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = headers.iter().map(|h| h.id_rfq.clone()).collect();
        let products = rfq_product::Entity::find()
            .filter(rfq_product::Column::IdRfq.is_in(ids))
            .order_by_asc(rfq_product::Column::IdRfqProduct)
            .all(db)
            .await
            .map_err(storage_error("list RFQ products"))?;
        let mut grouped = group_by_document(products, |p| p.id_rfq.as_str());

        headers
            .into_iter()
            .map(|header| {
                let lines = grouped.remove(&header.id_rfq).unwrap_or_default();
                Rfq::hydrate(header, lines)
            })
            .collect()
    }

    pub async fn has_bills<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, ServiceError> {
        let count = vendor_bill::Entity::find()
            .filter(vendor_bill::Column::IdRfq.eq(id))
            .count(db)
            .await
            .map_err(storage_error("count RFQ bills"))?;
        Ok(count > 0)
    }
}

/// RFQ lines, upserted by material id. Each row also records the vendor.
pub struct RfqProductStore {
    vendor_id: String,
}

impl RfqProductStore {
    pub fn new(vendor_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
        }
    }
}

#[async_trait]
impl LineItemStore for RfqProductStore {
    type Item = PricedLineInput;

    fn prefix(&self) -> IdPrefix {
        IdPrefix::RFQ_PRODUCT
    }

    async fn find_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<Vec<PersistedItem>, ServiceError> {
        let rows = rfq_product::Entity::find()
            .filter(rfq_product::Column::IdRfq.eq(document_id))
            .order_by_asc(rfq_product::Column::IdRfqProduct)
            .all(txn)
            .await
            .map_err(storage_error("load RFQ products"))?;

        Ok(rows
            .into_iter()
            .map(|row| PersistedItem {
                id: row.id_rfq_product,
                catalog_id: row.id_product,
            })
            .collect())
    }

    async fn last_id(&self, txn: &DatabaseTransaction) -> Result<Option<String>, ServiceError> {
        rfq_product::Entity::find()
            .select_only()
            .column(rfq_product::Column::IdRfqProduct)
            .order_by_desc(rfq_product::Column::IdRfqProduct)
            .into_tuple::<String>()
            .one(txn)
            .await
            .map_err(storage_error("read last RFQ product id"))
    }

    async fn insert(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
        id: &str,
        item: &PricedLineInput,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        rfq_product::ActiveModel {
            id_rfq_product: Set(id.to_string()),
            id_rfq: Set(document_id.to_string()),
            id_product: Set(item.product_id.clone()),
            id_vendor: Set(self.vendor_id.clone()),
            product_name: Set(item.product_name.clone().unwrap_or_default()),
            quantity: Set(money::to_storage(item.quantity)),
            unit_price: Set(money::to_storage(item.unit_price)),
            tax: Set(money::to_storage(item.tax)),
            subtotal: Set(money::to_storage(item.subtotal)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map(|_| ())
        .map_err(storage_error("insert RFQ product"))
    }

    async fn update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        item: &PricedLineInput,
    ) -> Result<(), ServiceError> {
        rfq_product::ActiveModel {
            id_rfq_product: Set(id.to_string()),
            id_vendor: Set(self.vendor_id.clone()),
            product_name: Set(item.product_name.clone().unwrap_or_default()),
            quantity: Set(money::to_storage(item.quantity)),
            unit_price: Set(money::to_storage(item.unit_price)),
            tax: Set(money::to_storage(item.tax)),
            subtotal: Set(money::to_storage(item.subtotal)),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(txn)
        .await
        .map(|_| ())
        .map_err(storage_error("update RFQ product"))
    }

    async fn delete_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<u64, ServiceError> {
        rfq_product::Entity::delete_many()
            .filter(rfq_product::Column::IdRfq.eq(document_id))
            .exec(txn)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete RFQ products"))
    }
}
