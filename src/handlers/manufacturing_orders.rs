use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    ListParams, PageResponse,
};
use crate::{
    documents::money,
    errors::{ApiError, ServiceError},
    handlers::AppState,
    models::{ManufacturingOrderInput, ManufacturingOrderPatch},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Creates the router for manufacturing order endpoints
pub fn manufacturing_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_manufacturing_order).get(list_manufacturing_orders))
        .route(
            "/:id",
            get(get_manufacturing_order)
                .put(update_manufacturing_order)
                .delete(delete_manufacturing_order),
        )
        .route("/:id/advance", post(advance_manufacturing_order))
        .route("/:id/overview", get(manufacturing_order_overview))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateManufacturingOrderRequest {
    #[validate(length(min = 1, message = "id_product is required"))]
    pub id_product: String,
    #[validate(length(min = 1, message = "id_bom is required"))]
    pub id_bom: String,
    #[serde(alias = "qty")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub qty_to_produce: String,
}

impl CreateManufacturingOrderRequest {
    fn into_input(self) -> Result<ManufacturingOrderInput, ServiceError> {
        Ok(ManufacturingOrderInput {
            qty_to_produce: money::parse_quantity("qty_to_produce", &self.qty_to_produce)?,
            product_id: self.id_product,
            bom_id: self.id_bom,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateManufacturingOrderRequest {
    #[validate(length(min = 1, message = "id_bom cannot be empty"))]
    pub id_bom: Option<String>,
    #[serde(alias = "qty")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub qty_to_produce: Option<String>,
}

impl UpdateManufacturingOrderRequest {
    fn into_patch(self) -> Result<ManufacturingOrderPatch, ServiceError> {
        let qty_to_produce = self
            .qty_to_produce
            .as_deref()
            .map(|raw| money::parse_quantity("qty_to_produce", raw))
            .transpose()?;

        Ok(ManufacturingOrderPatch {
            bom_id: self.id_bom,
            qty_to_produce,
        })
    }
}

/// Create a manufacturing order in status draft
async fn create_manufacturing_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateManufacturingOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let order = state
        .services
        .manufacturing_orders
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!("Manufacturing order created: {}", order.id);
    Ok(created_response(order))
}

async fn list_manufacturing_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .manufacturing_orders
        .list(params.page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PageResponse::new(orders, params.page)))
}

async fn get_manufacturing_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .manufacturing_orders
        .get(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

async fn update_manufacturing_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateManufacturingOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let patch = payload.into_patch().map_err(map_service_error)?;

    let order = state
        .services
        .manufacturing_orders
        .update(&id, patch)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

async fn advance_manufacturing_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .manufacturing_orders
        .advance_status(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

async fn delete_manufacturing_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .manufacturing_orders
        .delete(&id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

async fn manufacturing_order_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state
        .services
        .manufacturing_orders
        .overview(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(overview))
}
