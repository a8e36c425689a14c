use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{group_by_document, storage_error, PageRequest};
use crate::documents::money;
use crate::documents::reconcile::{LineItemStore, PersistedItem};
use crate::documents::sequence::IdPrefix;
use crate::documents::status::Status;
use crate::entities::{bom, bom_material};
use crate::errors::ServiceError;
use crate::models::{Bom, BomInput, BomMaterialInput};

/// BOM headers
pub struct BomRepository;

impl BomRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<bom::Model>, ServiceError> {
        bom::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .map_err(storage_error("load BOM"))
    }

    /// Header with its materials, ordered by line-item id
    pub async fn find_hydrated<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<Bom>, ServiceError> {
        let Some(header) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };
        let materials = bom_material::Entity::find()
            .filter(bom_material::Column::IdBom.eq(id))
            .order_by_asc(bom_material::Column::IdBomMaterial)
            .all(db)
            .await
            .map_err(storage_error("load BOM materials"))?;

        Bom::hydrate(header, materials).map(Some)
    }

    pub async fn last_id<C: ConnectionTrait>(db: &C) -> Result<Option<String>, ServiceError> {
        bom::Entity::find()
            .select_only()
            .column(bom::Column::IdBom)
            .order_by_desc(bom::Column::IdBom)
            .into_tuple::<String>()
            .one(db)
            .await
            .map_err(storage_error("read last BOM id"))
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        id: &str,
        product_name: &str,
        input: &BomInput,
        status: &Status,
    ) -> Result<bom::Model, ServiceError> {
        let now = Utc::now();
        bom::ActiveModel {
            id_bom: Set(id.to_string()),
            id_product: Set(input.product_id.clone()),
            product_name: Set(product_name.to_string()),
            product_reference: Set(input.product_reference.clone()),
            quantity: Set(money::to_storage(input.quantity)),
            status: Set(status.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(storage_error("insert BOM"))
    }

    /// Rewrites the header fields. The status column is left alone.
    pub async fn update_header<C: ConnectionTrait>(
        db: &C,
        existing: bom::Model,
        product_name: &str,
        input: &BomInput,
    ) -> Result<bom::Model, ServiceError> {
        let mut active: bom::ActiveModel = existing.into();
        active.id_product = Set(input.product_id.clone());
        active.product_name = Set(product_name.to_string());
        active.product_reference = Set(input.product_reference.clone());
        active.quantity = Set(money::to_storage(input.quantity));
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update BOM"))
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        existing: bom::Model,
        status: &Status,
    ) -> Result<bom::Model, ServiceError> {
        let mut active: bom::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update BOM status"))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, ServiceError> {
        bom::Entity::delete_by_id(id.to_string())
            .exec(db)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete BOM"))
    }

    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        page: PageRequest,
    ) -> Result<Vec<Bom>, ServiceError> {
        let headers = bom::Entity::find()
            .order_by_asc(bom::Column::IdBom)
            .offset(page.offset())
            .limit(page.page_size)
            .all(db)
            .await
            .map_err(storage_error("list BOMs"))?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = headers.iter().map(|h| h.id_bom.clone()).collect();
        let materials = bom_material::Entity::find()
            .filter(bom_material::Column::IdBom.is_in(ids))
            .order_by_asc(bom_material::Column::IdBomMaterial)
            .all(db)
            .await
            .map_err(storage_error("list BOM materials"))?;
        let mut grouped = group_by_document(materials, |m| m.id_bom.as_str());

        headers
            .into_iter()
            .map(|header| {
                let lines = grouped.remove(&header.id_bom).unwrap_or_default();
                Bom::hydrate(header, lines)
            })
            .collect()
    }

    /// Manufacturing orders still pointing at the BOM
    pub async fn is_referenced<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, ServiceError> {
        use crate::entities::manufacturing_order;
        use sea_orm::PaginatorTrait;

        let count = manufacturing_order::Entity::find()
            .filter(manufacturing_order::Column::IdBom.eq(id))
            .count(db)
            .await
            .map_err(storage_error("count BOM references"))?;
        Ok(count > 0)
    }
}

/// BOM materials: replaced wholesale on every update
pub struct BomMaterialStore;

#[async_trait]
impl LineItemStore for BomMaterialStore {
    type Item = BomMaterialInput;

    fn prefix(&self) -> IdPrefix {
        IdPrefix::BOM_MATERIAL
    }

    async fn find_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<Vec<PersistedItem>, ServiceError> {
        let rows = bom_material::Entity::find()
            .filter(bom_material::Column::IdBom.eq(document_id))
            .order_by_asc(bom_material::Column::IdBomMaterial)
            .all(txn)
            .await
            .map_err(storage_error("load BOM materials"))?;

        Ok(rows
            .into_iter()
            .map(|row| PersistedItem {
                id: row.id_bom_material,
                catalog_id: row.id_material,
            })
            .collect())
    }

    async fn last_id(&self, txn: &DatabaseTransaction) -> Result<Option<String>, ServiceError> {
        bom_material::Entity::find()
            .select_only()
            .column(bom_material::Column::IdBomMaterial)
            .order_by_desc(bom_material::Column::IdBomMaterial)
            .into_tuple::<String>()
            .one(txn)
            .await
            .map_err(storage_error("read last BOM material id"))
    }

    async fn insert(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
        id: &str,
        item: &BomMaterialInput,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        bom_material::ActiveModel {
            id_bom_material: Set(id.to_string()),
            id_bom: Set(document_id.to_string()),
            id_material: Set(item.material_id.clone()),
            material_name: Set(item.material_name.clone().unwrap_or_default()),
            quantity: Set(money::to_storage(item.quantity)),
            unit: Set(item.unit.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map(|_| ())
        .map_err(storage_error("insert BOM material"))
    }

    async fn update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        item: &BomMaterialInput,
    ) -> Result<(), ServiceError> {
        bom_material::ActiveModel {
            id_bom_material: Set(id.to_string()),
            id_material: Set(item.material_id.clone()),
            material_name: Set(item.material_name.clone().unwrap_or_default()),
            quantity: Set(money::to_storage(item.quantity)),
            unit: Set(item.unit.clone()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(txn)
        .await
        .map(|_| ())
        .map_err(storage_error("update BOM material"))
    }

    async fn delete_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<u64, ServiceError> {
        bom_material::Entity::delete_many()
            .filter(bom_material::Column::IdBom.eq(document_id))
            .exec(txn)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete BOM materials"))
    }
}
