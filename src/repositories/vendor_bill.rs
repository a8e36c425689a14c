use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::storage_error;
use crate::entities::vendor_bill;
use crate::errors::ServiceError;
use crate::models::{VendorBill, VendorBillInput};

pub struct VendorBillRepository;

impl VendorBillRepository {
    pub async fn last_id<C: ConnectionTrait>(db: &C) -> Result<Option<String>, ServiceError> {
        vendor_bill::Entity::find()
            .select_only()
            .column(vendor_bill::Column::IdBill)
            .order_by_desc(vendor_bill::Column::IdBill)
            .into_tuple::<String>()
            .one(db)
            .await
            .map_err(storage_error("read last vendor bill id"))
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        id: &str,
        rfq_id: &str,
        vendor_id: &str,
        input: &VendorBillInput,
    ) -> Result<VendorBill, ServiceError> {
        let now = Utc::now();
        vendor_bill::ActiveModel {
            id_bill: Set(id.to_string()),
            id_rfq: Set(rfq_id.to_string()),
            id_vendor: Set(vendor_id.to_string()),
            bill_date: Set(input.bill_date.clone()),
            payment: Set(input.payment.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .map(VendorBill::from)
        .map_err(storage_error("insert vendor bill"))
    }

    pub async fn find_by_rfq<C: ConnectionTrait>(
        db: &C,
        rfq_id: &str,
    ) -> Result<Vec<VendorBill>, ServiceError> {
        let rows = vendor_bill::Entity::find()
            .filter(vendor_bill::Column::IdRfq.eq(rfq_id))
            .order_by_asc(vendor_bill::Column::IdBill)
            .all(db)
            .await
            .map_err(storage_error("list vendor bills"))?;
        Ok(rows.into_iter().map(VendorBill::from).collect())
    }
}
