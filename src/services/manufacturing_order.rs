use metrics::counter;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument};

use super::DocumentContext;
use crate::cache::ListView;
use crate::db::transaction::{self, IdRetryBudget};
use crate::documents::rollup::{self, CostInput};
use crate::documents::sequence::{self, IdPrefix};
use crate::documents::status::{Status, StatusTable};
use crate::documents::{money, not_found, require_non_empty, DocumentKind};
use crate::entities::bom;
use crate::errors::ServiceError;
use crate::models::{
    DocumentOverview, ManufacturingOrder, ManufacturingOrderInput, ManufacturingOrderPatch,
    PriceDetails,
};
use crate::repositories::{catalog, BomRepository, CatalogEntity, ManufacturingOrderRepository};

#[derive(Clone)]
pub struct ManufacturingOrderService {
    ctx: DocumentContext,
}

impl ManufacturingOrderService {
    pub fn new(ctx: DocumentContext) -> Self {
        Self { ctx }
    }

    pub fn status_table(&self) -> StatusTable {
        StatusTable::MANUFACTURING_ORDER
    }

    /// Loads the BOM and checks it describes `product_id`.
    async fn bom_for_product(
        &self,
        bom_id: &str,
        product_id: &str,
    ) -> Result<bom::Model, ServiceError> {
        let bom = BomRepository::find_by_id(&*self.ctx.db, bom_id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Bom, bom_id))?;
        if bom.id_product != product_id {
            return Err(ServiceError::ValidationError(format!(
                "BOM {} produces {}, not {}",
                bom_id, bom.id_product, product_id
            )));
        }
        Ok(bom)
    }

    async fn write_new(
        &self,
        txn: &DatabaseTransaction,
        input: &ManufacturingOrderInput,
    ) -> Result<String, ServiceError> {
        let last = ManufacturingOrderRepository::last_id(txn)
            .await?
            .unwrap_or_default();
        let id = sequence::next(IdPrefix::MANUFACTURING_ORDER, &last)?;
        ManufacturingOrderRepository::insert(txn, &id, input, &self.status_table().initial())
            .await?;
        Ok(id)
    }

    #[instrument(skip(self, input), fields(product_id = %input.product_id, bom_id = %input.bom_id))]
    pub async fn create(
        &self,
        input: ManufacturingOrderInput,
    ) -> Result<ManufacturingOrder, ServiceError> {
        require_non_empty("id_product", &input.product_id)?;
        require_non_empty("id_bom", &input.bom_id)?;
        money::require_positive("qty_to_produce", input.qty_to_produce)?;
        catalog::require(
            self.ctx.catalog.as_ref(),
            CatalogEntity::Product,
            &input.product_id,
        )
        .await?;
        self.bom_for_product(&input.bom_id, &input.product_id).await?;

        let mut budget = IdRetryBudget::new(
            "create manufacturing order",
            self.ctx.settings.id_retry_attempts,
        );
        let id = loop {
            let txn = transaction::begin(&self.ctx.db).await?;
            let outcome = self.write_new(&txn, &input).await;
            match transaction::finish(txn, outcome).await {
                Ok(id) => break id,
                Err(err) if budget.should_retry(&err) => continue,
                Err(err) => return Err(budget.give_up(err)),
            }
        };

        self.ctx.invalidate(DocumentKind::ManufacturingOrder).await;
        counter!("erp_documents.manufacturing_order.created", 1);
        info!(mo_id = %id, "Manufacturing order created");

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<ManufacturingOrder, ServiceError> {
        ManufacturingOrderRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::ManufacturingOrder, id))
            .and_then(ManufacturingOrder::try_from)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64) -> Result<Vec<ManufacturingOrder>, ServiceError> {
        let request = self.ctx.page_request(page)?;
        let db = self.ctx.db.clone();
        self.ctx
            .pages
            .get_or_load(ListView::ManufacturingOrderList, request.page, || async move {
                ManufacturingOrderRepository::find_page(&*db, request).await
            })
            .await
    }

    /// Changes the BOM and/or the quantity to produce.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: &str,
        patch: ManufacturingOrderPatch,
    ) -> Result<ManufacturingOrder, ServiceError> {
        let existing = ManufacturingOrderRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::ManufacturingOrder, id))?;

        let bom_id = match patch.bom_id {
            Some(bom_id) => {
                require_non_empty("id_bom", &bom_id)?;
                if bom_id != existing.id_bom {
                    self.bom_for_product(&bom_id, &existing.id_product).await?;
                }
                bom_id
            }
            None => existing.id_bom.clone(),
        };
        let qty_to_produce = match patch.qty_to_produce {
            Some(qty) => {
                money::require_positive("qty_to_produce", qty)?;
                qty
            }
            None => money::parse_persisted(id, "qty_to_produce", &existing.qty_to_produce)?,
        };

        let updated = ManufacturingOrderRepository::update_plan(
            &*self.ctx.db,
            existing,
            &bom_id,
            qty_to_produce,
        )
        .await?;

        self.ctx.invalidate(DocumentKind::ManufacturingOrder).await;
        info!(mo_id = %id, bom_id = %bom_id, "Manufacturing order updated");

        ManufacturingOrder::try_from(updated)
    }

    #[instrument(skip(self))]
    pub async fn advance_status(&self, id: &str) -> Result<ManufacturingOrder, ServiceError> {
        let header = ManufacturingOrderRepository::find_by_id(&*self.ctx.db, id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::ManufacturingOrder, id))?;
        let current = Status::from_persisted(header.status.clone());
        let transition = self.status_table().advance(&current)?;

        let updated =
            ManufacturingOrderRepository::set_status(&*self.ctx.db, header, &transition.to)
                .await?;

        self.ctx.invalidate(DocumentKind::ManufacturingOrder).await;
        info!(
            mo_id = %id,
            from = %transition.from,
            to = %transition.to,
            "Manufacturing order status advanced"
        );

        ManufacturingOrder::try_from(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let txn = transaction::begin(&self.ctx.db).await?;
        let outcome = async {
            if ManufacturingOrderRepository::find_by_id(&txn, id)
                .await?
                .is_none()
            {
                return Err(not_found(DocumentKind::ManufacturingOrder, id));
            }
            ManufacturingOrderRepository::delete(&txn, id).await
        }
        .await;
        transaction::finish(txn, outcome).await?;

        self.ctx.invalidate(DocumentKind::ManufacturingOrder).await;
        counter!("erp_documents.manufacturing_order.deleted", 1);
        info!(mo_id = %id, "Manufacturing order deleted");
        Ok(())
    }

    /// Material requirements of the run: the BOM scaled from its own batch
    /// quantity to `qty_to_produce`, costed at material make prices.
    #[instrument(skip(self))]
    pub async fn overview(&self, id: &str) -> Result<DocumentOverview, ServiceError> {
        let order = self.get(id).await?;
        let bom = BomRepository::find_hydrated(&*self.ctx.db, &order.bom_id)
            .await?
            .ok_or_else(|| not_found(DocumentKind::Bom, &order.bom_id))?;

        let scale = order
            .qty_to_produce
            .checked_div(bom.quantity)
            .ok_or_else(|| {
                ServiceError::DataIntegrity(format!(
                    "BOM {} batch quantity {} cannot be scaled",
                    bom.id, bom.quantity
                ))
            })?;

        let catalog = &self.ctx.catalog;
        let product_price = catalog
            .price_of(CatalogEntity::Product, &order.product_id)
            .await?;

        let mut inputs = Vec::with_capacity(bom.materials.len());
        for material in &bom.materials {
            let price = catalog
                .price_of(CatalogEntity::Material, &material.material_id)
                .await?;
            let quantity = material.quantity.checked_mul(scale).ok_or_else(|| {
                ServiceError::DataIntegrity(format!(
                    "required quantity of {} overflows",
                    material.id
                ))
            })?;
            inputs.push(CostInput {
                line_item_id: material.id.clone(),
                catalog_id: material.material_id.clone(),
                name: material.material_name.clone(),
                quantity,
                unit_value: price.make_price,
                stated_cost: None,
                catalog_price: Some(price.sell_price),
            });
        }
        let rollup = rollup::roll_up(inputs)?;

        Ok(DocumentOverview::new(
            DocumentKind::ManufacturingOrder,
            order.id,
            order.product_id.clone(),
            order.status,
            rollup,
        )
        .with_subject_details(PriceDetails {
            id: order.product_id,
            name: bom.product_name,
            sell_price: product_price.sell_price,
            make_price: product_price.make_price,
        }))
    }
}
