use metrics::counter;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument};

use super::DocumentContext;
use crate::cache::ListView;
use crate::db::transaction::{self, IdRetryBudget};
use crate::documents::reconcile::{self, LineItemPolicy, LineItemStore};
use crate::documents::rollup::{self, CostInput};
use crate::documents::sequence::{self, IdPrefix};
use crate::documents::status::{Status, StatusTable};
use crate::documents::{money, not_found, require_non_empty, DocumentKind};
use crate::errors::ServiceError;
use crate::models::{Bom, BomInput, BomMaterialInput, DocumentOverview, PriceDetails};
use crate::repositories::{BomMaterialStore, BomRepository, CatalogEntity};

/// BOM materials are not referenced from outside the BOM, so an update
/// replaces them wholesale.
const MATERIAL_POLICY: LineItemPolicy = LineItemPolicy::ReplaceAll;

#[derive(Clone)]
pub struct BomService {
    ctx: DocumentContext,
}

impl BomService {
    pub fn new(ctx: DocumentContext) -> Self {
        Self { ctx }
    }

    pub fn status_table(&self) -> StatusTable {
        StatusTable::BOM
    }

    /// Validates the input and resolves every name snapshot. Runs before
    /// any write.
    async fn prepare(&self, input: BomInput) -> Result<BomInput, ServiceError> {
        require_non_empty("id_product", &input.product_id)?;
        money::require_positive("quantity", input.quantity)?;
        for material in &input.materials {
            require_non_empty("id_material", &material.material_id)?;
            money::require_positive("quantity", material.quantity)?;
        }
        reconcile::ensure_unique_catalog_ids(&input.materials)?;

        let product_name = self
            .ctx
            .snapshot_name(CatalogEntity::Product, &input.product_id, input.product_name)
            .await?;

        let mut materials = Vec::with_capacity(input.materials.len());
        for material in input.materials {
            let material_name = self
                .ctx
                .snapshot_name(
                    CatalogEntity::Material,
                    &material.material_id,
                    material.material_name,
                )
                .await?;
            materials.push(BomMaterialInput {
                material_name: Some(material_name),
                ..material
            });
        }

        Ok(BomInput {
            product_name: Some(product_name),
            materials,
            ..input
        })
    }

    async fn write_new(
        &self,
        txn: &DatabaseTransaction,
        input: &BomInput,
    ) -> Result<String, ServiceError> {
        let last = BomRepository::last_id(txn).await?.unwrap_or_default();
        let id = sequence::next(IdPrefix::BOM, &last)?;
        let product_name = input.product_name.as_deref().unwrap_or_default();

        BomRepository::insert(txn, &id, product_name, input, &self.status_table().initial())
            .await?;
        let plan = reconcile::plan(MATERIAL_POLICY, &[], input.materials.clone())?;
        reconcile::apply(&BomMaterialStore, txn, &id, plan).await?;
        Ok(id)
    }

    /// Creates a BOM with its materials; status starts at `draft`.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn create(&self, input: BomInput) -> Result<Bom, ServiceError> {
        let input = self.prepare(input).await?;

        let mut budget = IdRetryBudget::new("create BOM", self.ctx.settings.id_retry_attempts);
        let id = loop {
            let txn = transaction::begin(&self.ctx.db).await?;
            let outcome = self.write_new(&txn, &input).await;
            match transaction::finish(txn, outcome).await {
                Ok(id) => break id,
                Err(err) if budget.should_retry(&err) => continue,
                Err(err) => return Err(budget.give_up(err)),
            }
        };

        self.ctx.invalidate(DocumentKind::Bom).await;
        counter!("erp_documents.bom.created", 1);
        info!(bom_id = %id, materials = input.materials.len(), "BOM created");

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<Bom, ServiceError> {
        BomRepository::find_hydrated(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Bom, id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64) -> Result<Vec<Bom>, ServiceError> {
        let request = self.ctx.page_request(page)?;
        let db = self.ctx.db.clone();
        self.ctx
            .pages
            .get_or_load(ListView::BomList, request.page, || async move {
                BomRepository::find_page(&*db, request).await
            })
            .await
    }

    /// Rewrites the header and replaces every material. Status is untouched,
    /// and the product is fixed once a manufacturing order uses the BOM.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: BomInput) -> Result<Bom, ServiceError> {
        if BomRepository::find_by_id(&*self.ctx.db, id).await?.is_none() {
            return Err(not_found(DocumentKind::Bom, id));
        }
        let input = self.prepare(input).await?;

        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            let existing = BomRepository::find_by_id(&txn, id)
                .await?
                .ok_or_else(|| not_found(DocumentKind::Bom, id))?;
            if existing.id_product != input.product_id
                && BomRepository::is_referenced(&txn, id).await?
            {
                return Err(ServiceError::Conflict(format!(
                    "BOM {} is used by a manufacturing order and cannot move to product {}",
                    id, input.product_id
                )));
            }
            let product_name = input.product_name.as_deref().unwrap_or_default();
            BomRepository::update_header(&txn, existing, product_name, &input).await?;

            let persisted = BomMaterialStore.find_by_document(&txn, id).await?;
            let plan = reconcile::plan(MATERIAL_POLICY, &persisted, input.materials.clone())?;
            reconcile::apply(&BomMaterialStore, &txn, id, plan).await
        }
        .await;
        let summary = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Bom).await;
        info!(
            bom_id = %id,
            deleted = summary.deleted,
            inserted = summary.inserted,
            "BOM updated"
        );

        self.get(id).await
    }

    /// Moves the BOM one step along its status table.
    #[instrument(skip(self))]
    pub async fn advance_status(&self, id: &str) -> Result<Bom, ServiceError> {
        let header = BomRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Bom, id))?;
        let current = Status::from_persisted(header.status.clone());
        let transition = self.status_table().advance(&current)?;

        BomRepository::set_status(&*self.ctx.db, header, &transition.to).await?;

        self.ctx.invalidate(DocumentKind::Bom).await;
        info!(bom_id = %id, from = %transition.from, to = %transition.to, "BOM status advanced");

        self.get(id).await
    }

    /// Deletes the materials, then the header. Fails while a manufacturing
    /// order still uses the BOM.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            if BomRepository::find_by_id(&txn, id).await?.is_none() {
                return Err(not_found(DocumentKind::Bom, id));
            }
            if BomRepository::is_referenced(&txn, id).await? {
                return Err(ServiceError::Conflict(format!(
                    "BOM {} is used by a manufacturing order",
                    id
                )));
            }
            let materials = BomMaterialStore.delete_by_document(&txn, id).await?;
            BomRepository::delete(&txn, id).await?;
            Ok::<_, ServiceError>(materials)
        }
        .await;
        let materials = transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::Bom).await;
        counter!("erp_documents.bom.deleted", 1);
        info!(bom_id = %id, materials, "BOM deleted");
        Ok(())
    }

    /// Material cost of one BOM run at the materials' make prices.
    #[instrument(skip(self))]
    pub async fn overview(&self, id: &str) -> Result<DocumentOverview, ServiceError> {
        let bom = self.get(id).await?;
        let catalog = &self.ctx.catalog;

        let product_price = catalog
            .price_of(CatalogEntity::Product, &bom.product_id)
            .await?;

        let mut inputs = Vec::with_capacity(bom.materials.len());
        for material in &bom.materials {
            let price = catalog
                .price_of(CatalogEntity::Material, &material.material_id)
                .await?;
            inputs.push(CostInput {
                line_item_id: material.id.clone(),
                catalog_id: material.material_id.clone(),
                name: material.material_name.clone(),
                quantity: material.quantity,
                unit_value: price.make_price,
                stated_cost: None,
                catalog_price: Some(price.sell_price),
            });
        }
        let rollup = rollup::roll_up(inputs)?;

        Ok(DocumentOverview::new(
            DocumentKind::Bom,
            bom.id,
            bom.product_id.clone(),
            bom.status,
            rollup,
        )
        .with_subject_details(PriceDetails {
            id: bom.product_id,
            name: bom.product_name,
            sell_price: product_price.sell_price,
            make_price: product_price.make_price,
        }))
    }
}
