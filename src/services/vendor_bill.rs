use metrics::counter;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument};

use super::DocumentContext;
use crate::db::transaction::{self, IdRetryBudget};
use crate::documents::sequence::{self, IdPrefix};
use crate::documents::status::{rfq_status, Status, StatusTable};
use crate::documents::{not_found, require_non_empty, DocumentKind};
use crate::entities::rfq;
use crate::errors::ServiceError;
use crate::models::{VendorBill, VendorBillInput};
use crate::repositories::{RfqRepository, VendorBillRepository};

/// Vendor bills recorded against received RFQs
#[derive(Clone)]
pub struct VendorBillService {
    ctx: DocumentContext,
}

impl VendorBillService {
    pub fn new(ctx: DocumentContext) -> Self {
        Self { ctx }
    }

    fn rfq_table(&self) -> StatusTable {
        StatusTable::rfq(self.ctx.settings.rfq_status_tail)
    }

    async fn load_rfq(&self, rfq_id: &str) -> Result<rfq::Model, ServiceError> {
        RfqRepository::find_by_id(&*self.ctx.db, rfq_id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Rfq, rfq_id))
    }

    async fn write_new(
        &self,
        txn: &DatabaseTransaction,
        rfq: &rfq::Model,
        input: &VendorBillInput,
    ) -> Result<VendorBill, ServiceError> {
        let last = VendorBillRepository::last_id(txn)
            .await?
            .unwrap_or_default();
        let id = sequence::next(IdPrefix::VENDOR_BILL, &last)?;
        VendorBillRepository::insert(txn, &id, &rfq.id_rfq, &rfq.id_vendor, input).await
    }

    /// Records a bill for an RFQ whose goods were received. The vendor is
    /// taken from the RFQ.
    #[instrument(skip(self, input))]
    pub async fn create_bill(
        &self,
        rfq_id: &str,
        input: VendorBillInput,
    ) -> Result<VendorBill, ServiceError> {
        require_non_empty("bill_date", &input.bill_date)?;
        require_non_empty("payment", &input.payment)?;

        let rfq = self.load_rfq(rfq_id).await?;
        let status = Status::from_persisted(rfq.status.clone());
        if !self.rfq_table().reached(&status, rfq_status::RECEIVED) {
            return Err(ServiceError::InvalidTransition(format!(
                "RFQ {} is in status '{}' and cannot be billed before '{}'",
                rfq_id,
                status,
                rfq_status::RECEIVED
            )));
        }

        let mut budget =
            IdRetryBudget::new("create vendor bill", self.ctx.settings.id_retry_attempts);
        let bill = loop {
            let txn = transaction::begin(&self.ctx.db).await?;
            let outcome = self.write_new(&txn, &rfq, &input).await;
            match transaction::finish(txn, outcome).await {
                Ok(bill) => break bill,
                Err(err) if budget.should_retry(&err) => continue,
                Err(err) => return Err(budget.give_up(err)),
            }
        };

        self.ctx.invalidate(DocumentKind::VendorBill).await;
        counter!("erp_documents.vendor_bill.created", 1);
        info!(bill_id = %bill.id, rfq_id = %rfq_id, "Vendor bill created");

        Ok(bill)
    }

    #[instrument(skip(self))]
    pub async fn list_bills(&self, rfq_id: &str) -> Result<Vec<VendorBill>, ServiceError> {
        self.load_rfq(rfq_id).await?;
        VendorBillRepository::find_by_rfq(&*self.ctx.db, rfq_id).await
    }
}
