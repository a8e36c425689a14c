use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{group_by_document, storage_error, PageRequest};
use crate::documents::money;
use crate::documents::reconcile::{LineItemStore, PersistedItem};
use crate::documents::sequence::IdPrefix;
use crate::documents::status::Status;
use crate::entities::{quotation, quotation_product};
use crate::errors::ServiceError;
use crate::models::{PricedLineInput, Quotation, QuotationInput};

pub struct QuotationRepository;

impl QuotationRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<quotation::Model>, ServiceError> {
        quotation::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .map_err(storage_error("load quotation"))
    }

    pub async fn find_hydrated<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<Quotation>, ServiceError> {
        let Some(header) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let products = quotation_product::Entity::find()
            .filter(quotation_product::Column::IdQuotation.eq(id))
            .order_by_asc(quotation_product::Column::IdQuotationProduct)
            .all(db)
            .await
            .map_err(storage_error("load quotation products"))?;

        Quotation::hydrate(header, products).map(Some)
    }

    pub async fn last_id<C: ConnectionTrait>(db: &C) -> Result<Option<String>, ServiceError> {
        quotation::Entity::find()
            .select_only()
            .column(quotation::Column::IdQuotation)
            .order_by_desc(quotation::Column::IdQuotation)
            .into_tuple::<String>()
            .one(db)
            .await
            .map_err(storage_error("read last quotation id"))
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        id: &str,
        input: &QuotationInput,
        status: &Status,
    ) -> Result<quotation::Model, ServiceError> {
        let now = Utc::now();
        quotation::ActiveModel {
            id_quotation: Set(id.to_string()),
            id_customer: Set(input.customer_id.clone()),
            order_date: Set(input.order_date.clone()),
            status: Set(status.as_str().to_string()),
            payment: Set(input.payment.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(storage_error("insert quotation"))
    }

    pub async fn update_header<C: ConnectionTrait>(
        db: &C,
        existing: quotation::Model,
        input: &QuotationInput,
    ) -> Result<quotation::Model, ServiceError> {
        let mut active: quotation::ActiveModel = existing.into();
        active.id_customer = Set(input.customer_id.clone());
        active.order_date = Set(input.order_date.clone());
        active.payment = Set(input.payment.clone());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update quotation"))
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        existing: quotation::Model,
        status: &Status,
    ) -> Result<quotation::Model, ServiceError> {
        let mut active: quotation::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update quotation status"))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, ServiceError> {
        quotation::Entity::delete_by_id(id.to_string())
            .exec(db)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete quotation"))
    }

    /// A page of quotations, restricted to `statuses` unless it is empty.
    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        statuses: &[&str],
        page: PageRequest,
    ) -> Result<Vec<Quotation>, ServiceError> {
        let mut filter = Condition::all();
        if !statuses.is_empty() {
            filter = filter.add(quotation::Column::Status.is_in(statuses.iter().copied()));
        }

        let headers = quotation::Entity::find()
            .filter(filter)
            .order_by_asc(quotation::Column::IdQuotation)
            .offset(page.offset())
            .limit(page.page_size)
            .all(db)
            .await
            .map_err(storage_error("list quotations"))?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = headers.iter().map(|h| h.id_quotation.clone()).collect();
        let products = quotation_product::Entity::find()
            .filter(quotation_product::Column::IdQuotation.is_in(ids))
            .order_by_asc(quotation_product::Column::IdQuotationProduct)
            .all(db)
            .await
            .map_err(storage_error("list quotation products"))?;
        let mut grouped = group_by_document(products, |p| p.id_quotation.as_str());

        headers
            .into_iter()
            .map(|header| {
                let lines = grouped.remove(&header.id_quotation).unwrap_or_default();
                Quotation::hydrate(header, lines)
            })
            .collect()
    }
}

/// Quotation lines, upserted by product id
pub struct QuotationProductStore {
    customer_id: String,
}

impl QuotationProductStore {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
        }
    }
}

#[async_trait]
impl LineItemStore for QuotationProductStore {
    type Item = PricedLineInput;

    fn prefix(&self) -> IdPrefix {
        IdPrefix::QUOTATION_PRODUCT
    }

    async fn find_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<Vec<PersistedItem>, ServiceError> {
        let rows = quotation_product::Entity::find()
            .filter(quotation_product::Column::IdQuotation.eq(document_id))
            .order_by_asc(quotation_product::Column::IdQuotationProduct)
            .all(txn)
            .await
            .map_err(storage_error("load quotation products"))?;

        Ok(rows
            .into_iter()
            .map(|row| PersistedItem {
                id: row.id_quotation_product,
                catalog_id: row.id_product,
            })
            .collect())
    }

    async fn last_id(&self, txn: &DatabaseTransaction) -> Result<Option<String>, ServiceError> {
        quotation_product::Entity::find()
            .select_only()
            .column(quotation_product::Column::IdQuotationProduct)
            .order_by_desc(quotation_product::Column::IdQuotationProduct)
            .into_tuple::<String>()
            .one(txn)
            .await
            .map_err(storage_error("read last quotation product id"))
    }

    async fn insert(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
        id: &str,
        item: &PricedLineInput,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        quotation_product::ActiveModel {
            id_quotation_product: Set(id.to_string()),
            id_quotation: Set(document_id.to_string()),
            id_product: Set(item.product_id.clone()),
            id_customer: Set(self.customer_id.clone()),
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
        .map_err(storage_error("insert quotation product"))
    }

    async fn update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        item: &PricedLineInput,
    ) -> Result<(), ServiceError> {
        quotation_product::ActiveModel {
            id_quotation_product: Set(id.to_string()),
            id_customer: Set(self.customer_id.clone()),
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
        .map_err(storage_error("update quotation product"))
    }

    async fn delete_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<u64, ServiceError> {
        quotation_product::Entity::delete_many()
            .filter(quotation_product::Column::IdQuotation.eq(document_id))
            .exec(txn)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete quotation products"))
    }
}
