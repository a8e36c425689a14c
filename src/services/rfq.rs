use metrics::counter;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument};

use super::{informational_price, DocumentContext};
use crate::cache::ListView;
use crate::db::transaction::{self, IdRetryBudget};
use crate::documents::reconcile::{self, LineItemPolicy, LineItemStore};
use crate::documents::rollup::{self, CostInput};
use crate::documents::sequence::{self, IdPrefix};
use crate::documents::status::{rfq_status, Status, StatusTable};
use crate::documents::{money, not_found, require_non_empty, DocumentKind};
use crate::errors::ServiceError;
use crate::models::{DocumentOverview, PricedLineInput, Rfq, RfqInput};
use crate::repositories::{catalog, CatalogEntity, PageRequest, RfqProductStore, RfqRepository};

/// RFQ lines are matched by material and updated in place; lines missing
/// from an update are kept.
const PRODUCT_POLICY: LineItemPolicy = LineItemPolicy::UpsertRetain;

#[derive(Clone)]
pub struct RfqService {
    ctx: DocumentContext,
}

impl RfqService {
    pub fn new(ctx: DocumentContext) -> Self {
        Self { ctx }
    }

    pub fn status_table(&self) -> StatusTable {
        StatusTable::rfq(self.ctx.settings.rfq_status_tail)
    }

    /// Statuses before goods are received
    fn open_statuses(&self) -> Vec<&'static str> {
        self.status_table().states_before(rfq_status::RECEIVED)
    }

    /// Received and everything after it
    fn billable_statuses(&self) -> Vec<&'static str> {
        self.status_table().states_from(rfq_status::RECEIVED)
    }

    async fn prepare(&self, input: RfqInput) -> Result<RfqInput, ServiceError> {
        require_non_empty("id_vendor", &input.vendor_id)?;
        require_non_empty("order_date", &input.order_date)?;
        for line in &input.products {
            require_non_empty("id_product", &line.product_id)?;
            money::require_positive("quantity", line.quantity)?;
        }
        reconcile::ensure_unique_catalog_ids(&input.products)?;

        catalog::require(
            self.ctx.catalog.as_ref(),
            CatalogEntity::Vendor,
            &input.vendor_id,
        )
        .await?;

        let mut products = Vec::with_capacity(input.products.len());
        for line in input.products {
            let product_name = self
                .ctx
                .snapshot_name(CatalogEntity::Material, &line.product_id, line.product_name)
                .await?;
            products.push(PricedLineInput {
                product_name: Some(product_name),
                ..line
            });
        }

        Ok(RfqInput { products, ..input })
    }

    async fn write_new(
        &self,
        txn: &DatabaseTransaction,
        input: &RfqInput,
    ) -> Result<String, ServiceError> {
        let last = RfqRepository::last_id(txn).await?.unwrap_or_default();
        let id = sequence::next(IdPrefix::RFQ, &last)?;

        RfqRepository::insert(txn, &id, input, &self.status_table().initial()).await?;
        let plan = reconcile::plan(PRODUCT_POLICY, &[], input.products.clone())?;
        reconcile::apply(&RfqProductStore::new(&input.vendor_id), txn, &id, plan).await?;
        Ok(id)
    }

    /// Creates an RFQ in status `RFQ` with its lines.
    #[instrument(skip(self, input), fields(vendor_id = %input.vendor_id))]
    pub async fn create(&self, input: RfqInput) -> Result<Rfq, ServiceError> {
        let input = self.prepare(input).await?;

        let mut budget = IdRetryBudget::new("create RFQ", self.ctx.settings.id_retry_attempts);
        let id = loop {
            let txn = transaction::begin(&self.ctx.db).await?;
            let outcome = self.write_new(&txn, &input).await;
            match transaction::finish(txn, outcome).await {
                Ok(id) => break id,
                Err(err) if budget.should_retry(&err) => continue,
                Err(err) => return Err(budget.give_up(err)),
            }
        };

        self.ctx.invalidate(DocumentKind::Rfq).await;
        counter!("erp_documents.rfq.created", 1);
        info!(rfq_id = %id, lines = input.products.len(), "RFQ created");

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Rfq, ServiceError> {
        RfqRepository::find_hydrated(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Rfq, id))
    }

    async fn page(
        &self,
        view: ListView,
        statuses: Vec<&'static str>,
        request: PageRequest,
    ) -> Result<Vec<Rfq>, ServiceError> {
        let db = self.ctx.db.clone();
        self.ctx
            .pages
            .get_or_load(view, request.page, || async move {
                RfqRepository::find_page(&*db, &statuses, request).await
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64) -> Result<Vec<Rfq>, ServiceError> {
        self.page(ListView::RfqList, Vec::new(), self.ctx.page_request(page)?)
            .await
    }

    /// RFQs not yet received
    #[instrument(skip(self))]
    pub async fn list_open(&self, page: u64) -> Result<Vec<Rfq>, ServiceError> {
        self.page(
            ListView::RfqOpenList,
            self.open_statuses(),
            self.ctx.page_request(page)?,
        )
        .await
    }

    /// RFQs that can take a vendor bill
    #[instrument(skip(self))]
    pub async fn list_billable(&self, page: u64) -> Result<Vec<Rfq>, ServiceError> {
        self.page(
            ListView::RfqBillableList,
            self.billable_statuses(),
            self.ctx.page_request(page)?,
        )
        .await
    }

    /// Rewrites the header and upserts the lines by material id.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: RfqInput) -> Result<Rfq, ServiceError> {
        if RfqRepository::find_by_id(&*self.ctx.db, id).await?.is_none() {
            return Err(not_found(DocumentKind::Rfq, id));
        }
        let input = self.prepare(input).await?;

        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            let existing = RfqRepository::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| not_found(DocumentKind::Rfq, id))?;
            RfqRepository::update_header(&txn, existing, &input).await?;

            let store = RfqProductStore::new(&input.vendor_id);
            let persisted = store.find_by_document(&txn, id).await?;
            let plan = reconcile::plan(PRODUCT_POLICY, &persisted, input.products.clone())?;
            reconcile::apply(&store, &txn, id, plan).await
        }
        .await;
        let summary = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Rfq).await;
        info!(
            rfq_id = %id,
            updated = summary.updated,
            inserted = summary.inserted,
            retained = summary.retained,
            "RFQ updated"
        );

        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn advance_status(&self, id: &str) -> Result<Rfq, ServiceError> {
        let header = RfqRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Rfq, id))?;
        let current = Status::from_persisted(header.status.clone());
        let transition = self.status_table().advance(&current)?;

        RfqRepository::set_status(&*self.ctx.db, header, &transition.to).await?;

        self.ctx.invalidate(DocumentKind::Rfq).await;
        info!(rfq_id = %id, from = %transition.from, to = %transition.to, "RFQ status advanced");

        self.get(id).await
    }

    /// Deletes the lines, then the header. RFQs that were billed stay.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            let header = RfqRepository::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| not_found(DocumentKind::Rfq, id))?;
            if RfqRepository::has_bills(&txn, id).await? {
                return Err(ServiceError::Conflict(format!(
                    "RFQ {} has vendor bills and cannot be deleted",
                    id
                )));
            }
            let lines = RfqProductStore::new(header.id_vendor)
                .delete_by_document(&txn, id)
                .await?;
            RfqRepository::delete(&txn, id).await?;
            Ok::<_, ServiceError>(lines)
        }
        .await;
        let lines = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Rfq).await;
        counter!("erp_documents.rfq.deleted", 1);
        info!(rfq_id = %id, lines, "RFQ deleted");
        Ok(())
    }

    /// Cost of the RFQ at the quoted unit prices. The material's catalog
    /// sell price is shown per line when the material still exists.
    #[instrument(skip(self))]
    pub async fn overview(&self, id: &str) -> Result<DocumentOverview, ServiceError> {
        let rfq = self.get(id).await?;

        let mut inputs = Vec::with_capacity(rfq.products.len());
        for line in &rfq.products {
            let catalog_price = informational_price(
                self.ctx.catalog.as_ref(),
                CatalogEntity::Material,
                &line.product_id,
            )
            .await?;
            inputs.push(CostInput {
                line_item_id: line.id.clone(),
                catalog_id: line.product_id.clone(),
                name: line.product_name.clone(),
                quantity: line.quantity,
                unit_value: line.unit_price,
                stated_cost: Some(line.subtotal),
                catalog_price,
            });
        }
        let rollup = rollup::roll_up(inputs)?;

        Ok(DocumentOverview::new(
            DocumentKind::Rfq,
            rfq.id,
            rfq.vendor_id,
            rfq.status,
            rollup,
        )
        .with_order_date(rfq.order_date))
    }
}
