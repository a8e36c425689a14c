use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set,
};

use super::{storage_error, PageRequest};
use crate::documents::money;
use crate::documents::status::Status;
use crate::entities::manufacturing_order;
use crate::errors::ServiceError;
use crate::models::{ManufacturingOrder, ManufacturingOrderInput};

/// Manufacturing orders carry no line items of their own.
pub struct ManufacturingOrderRepository;

impl ManufacturingOrderRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: &str,
    ) -> Result<Option<manufacturing_order::Model>, ServiceError> {
        manufacturing_order::Entity::find_by_id(id.to_string())
            .one(db)
            .await
            .map_err(storage_error("load manufacturing order"))
    }

    pub async fn last_id<C: ConnectionTrait>(db: &C) -> Result<Option<String>, ServiceError> {
        manufacturing_order::Entity::find()
            .select_only()
            .column(manufacturing_order::Column::IdMo)
            .order_by_desc(manufacturing_order::Column::IdMo)
            .into_tuple::<String>()
            .one(db)
            .await
            .map_err(storage_error("read last manufacturing order id"))
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        id: &str,
        input: &ManufacturingOrderInput,
        status: &Status,
    ) -> Result<manufacturing_order::Model, ServiceError> {
        let now = Utc::now();
        manufacturing_order::ActiveModel {
            id_mo: Set(id.to_string()),
            id_product: Set(input.product_id.clone()),
            id_bom: Set(input.bom_id.clone()),
            qty_to_produce: Set(money::to_storage(input.qty_to_produce)),
            status: Set(status.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(storage_error("insert manufacturing order"))
    }

    pub async fn update_plan<C: ConnectionTrait>(
        db: &C,
        existing: manufacturing_order::Model,
        bom_id: &str,
        qty_to_produce: Decimal,
    ) -> Result<manufacturing_order::Model, ServiceError> {
        let mut active: manufacturing_order::ActiveModel = existing.into();
        active.id_bom = Set(bom_id.to_string());
        active.qty_to_produce = Set(money::to_storage(qty_to_produce));
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update manufacturing order"))
    }

    pub async fn set_status<C: ConnectionTrait>(
        db: &C,
        existing: manufacturing_order::Model,
        status: &Status,
    ) -> Result<manufacturing_order::Model, ServiceError> {
        let mut active: manufacturing_order::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        active
            .update(db)
            .await
            .map_err(storage_error("update manufacturing order status"))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<u64, ServiceError> {
        manufacturing_order::Entity::delete_by_id(id.to_string())
            .exec(db)
            .await
            .map(|res| res.rows_affected)
            .map_err(storage_error("delete manufacturing order"))
    }

    pub async fn find_page<C: ConnectionTrait>(
        db: &C,
        page: PageRequest,
    ) -> Result<Vec<ManufacturingOrder>, ServiceError> {
        manufacturing_order::Entity::find()
            .order_by_asc(manufacturing_order::Column::IdMo)
            .offset(page.offset())
            .limit(page.page_size)
            .all(db)
            .await
            .map_err(storage_error("list manufacturing orders"))?
            .into_iter()
            .map(ManufacturingOrder::try_from)
            .collect()
    }
}
