use metrics::counter;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument};

use super::{informational_price, DocumentContext};
use crate::cache::ListView;
use crate::db::transaction::{self, IdRetryBudget};
use crate::documents::reconcile::{self, LineItemPolicy, LineItemStore};
use crate::documents::rollup::{self, CostInput};
use crate::documents::sequence::{self, IdPrefix};
use crate::documents::status::{quotation_status, Status, StatusTable};
use crate::documents::{money, not_found, require_non_empty, DocumentKind};
use crate::errors::ServiceError;
use crate::models::{DocumentOverview, PricedLineInput, Quotation, QuotationInput};
use crate::repositories::{
    catalog, CatalogEntity, PageRequest, QuotationProductStore, QuotationRepository,
};

const PRODUCT_POLICY: LineItemPolicy = LineItemPolicy::UpsertRetain;

#[derive(Clone)]
pub struct QuotationService {
    ctx: DocumentContext,
}

impl QuotationService {
    pub fn new(ctx: DocumentContext) -> Self {
        Self { ctx }
    }

    pub fn status_table(&self) -> StatusTable {
        StatusTable::quotation(self.ctx.settings.quotation_status_tail)
    }

    async fn prepare(&self, input: QuotationInput) -> Result<QuotationInput, ServiceError> {
        require_non_empty("id_customer", &input.customer_id)?;
        require_non_empty("order_date", &input.order_date)?;
        for line in &input.products {
            require_non_empty("id_product", &line.product_id)?;
            money::require_positive("quantity", line.quantity)?;
        }
        reconcile::ensure_unique_catalog_ids(&input.products)?;

        catalog::require(
            self.ctx.catalog.as_ref(),
            CatalogEntity::Customer,
            &input.customer_id,
        )
        .await?;

        let mut products = Vec::with_capacity(input.products.len());
        for line in input.products {
            let product_name = self
                .ctx
                .snapshot_name(CatalogEntity::Product, &line.product_id, line.product_name)
                .await?;
            products.push(PricedLineInput {
                product_name: Some(product_name),
                ..line
            });
        }

        Ok(QuotationInput { products, ..input })
    }

    async fn write_new(
        &self,
        txn: &DatabaseTransaction,
        input: &QuotationInput,
    ) -> Result<String, ServiceError> {
        let last = QuotationRepository::last_id(txn).await?.unwrap_or_default();
        let id = sequence::next(IdPrefix::QUOTATION, &last)?;

        QuotationRepository::insert(txn, &id, input, &self.status_table().initial()).await?;
        let plan = reconcile::plan(PRODUCT_POLICY, &[], input.products.clone())?;
        reconcile::apply(
            &QuotationProductStore::new(&input.customer_id),
            txn,
            &id,
            plan,
        )
        .await?;
        Ok(id)
    }

    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create(&self, input: QuotationInput) -> Result<Quotation, ServiceError> {
        let input = self.prepare(input).await?;

        let mut budget =
            IdRetryBudget::new("create quotation", self.ctx.settings.id_retry_attempts);
        let id = loop {
            let txn = transaction::begin(&self.ctx.db).await?;
            let outcome = self.write_new(&txn, &input).await;
            match transaction::finish(txn, outcome).await {
                Ok(id) => break id,
                Err(err) if budget.should_retry(&err) => continue,
                Err(err) => return Err(budget.give_up(err)),
            }
        };

        self.ctx.invalidate(DocumentKind::Quotation).await;
        counter!("erp_documents.quotation.created", 1);
        info!(quotation_id = %id, lines = input.products.len(), "Quotation created");

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Quotation, ServiceError> {
        QuotationRepository::find_hydrated(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Quotation, id))
    }

    async fn page(
        &self,
        view: ListView,
        statuses: Vec<&'static str>,
        request: PageRequest,
    ) -> Result<Vec<Quotation>, ServiceError> {
        let db = self.ctx.db.clone();
        self.ctx
            .pages
            .get_or_load(view, request.page, || async move {
                QuotationRepository::find_page(&*db, &statuses, request).await
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64) -> Result<Vec<Quotation>, ServiceError> {
        self.page(ListView::QuotationList, Vec::new(), self.ctx.page_request(page)?)
            .await
    }

    /// Quotations not yet invoiced
    #[instrument(skip(self))]
    pub async fn list_open(&self, page: u64) -> Result<Vec<Quotation>, ServiceError> {
        let statuses = self.status_table().states_before(quotation_status::INVOICED);
        self.page(ListView::QuotationOpenList, statuses, self.ctx.page_request(page)?)
            .await
    }

    /// Confirmed sales orders and everything after them
    #[instrument(skip(self))]
    pub async fn list_billable(&self, page: u64) -> Result<Vec<Quotation>, ServiceError> {
        let statuses = self.status_table().states_from(quotation_status::SALES_ORDER);
        self.page(
            ListView::QuotationBillableList,
            statuses,
            self.ctx.page_request(page)?,
        )
        .await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: QuotationInput) -> Result<Quotation, ServiceError> {
        if QuotationRepository::find_by_id(&*self.ctx.db, id).await?.is_none() {
            return Err(not_found(DocumentKind::Quotation, id));
        }
        let input = self.prepare(input).await?;

        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            let existing = QuotationRepository::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| not_found(DocumentKind::Quotation, id))?;
            QuotationRepository::update_header(&txn, existing, &input).await?;

            let store = QuotationProductStore::new(&input.customer_id);
            let persisted = store.find_by_document(&txn, id).await?;
            let plan = reconcile::plan(PRODUCT_POLICY, &persisted, input.products.clone())?;
            reconcile::apply(&store, &txn, id, plan).await
        }
        .await;
        let summary = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Quotation).await;
        info!(
            quotation_id = %id,
            updated = summary.updated,
            inserted = summary.inserted,
            retained = summary.retained,
            "Quotation updated"
        );

        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn advance_status(&self, id: &str) -> Result<Quotation, ServiceError> {
        let header = QuotationRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Quotation, id))?;
        let current = Status::from_persisted(header.status.clone());
        let transition = self.status_table().advance(&current)?;

        QuotationRepository::set_status(&*self.ctx.db, header, &transition.to).await?;

        self.ctx.invalidate(DocumentKind::Quotation).await;
        info!(
            quotation_id = %id,
            from = %transition.from,
            to = %transition.to,
            "Quotation status advanced"
        );

        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            let header = QuotationRepository::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| not_found(DocumentKind::Quotation, id))?;
            let lines = QuotationProductStore::new(header.id_customer)
                .delete_by_document(&txn, id)
                .await?;
            QuotationRepository::delete(&txn, id).await?;
            Ok::<_, ServiceError>(lines)
        }
        .await;
        let lines = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Quotation).await;
        counter!("erp_documents.quotation.deleted", 1);
        info!(quotation_id = %id, lines, "Quotation deleted");
        Ok(())
    }

    /// Value of the quotation at the quoted unit prices, with each product's
    /// catalog sell price alongside.
    #[instrument(skip(self))]
    pub async fn overview(&self, id: &str) -> Result<DocumentOverview, ServiceError> {
        let quotation = self.get(id).await?;

        let mut inputs = Vec::with_capacity(quotation.products.len());
        for line in &quotation.products {
            let catalog_price = informational_price(
                self.ctx.catalog.as_ref(),
                CatalogEntity::Product,
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
            DocumentKind::Quotation,
            quotation.id,
            quotation.customer_id,
            quotation.status,
            rollup,
        )
        .with_order_date(quotation.order_date))
    }
}
