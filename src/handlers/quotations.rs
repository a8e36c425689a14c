use super::common::{
    created_response, map_service_error, no_content_response, priced_lines, success_response,
    validate_input, ListParams, ListSelection, PageResponse, PricedLineRequest,
};
use crate::{
    errors::{ApiError, ServiceError},
    handlers::AppState,
    models::QuotationInput,
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

pub fn quotation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quotation).get(list_quotations))
        .route(
            "/:id",
            get(get_quotation).put(update_quotation).delete(delete_quotation),
        )
        .route("/:id/advance", post(advance_quotation))
        .route("/:id/overview", get(quotation_overview))
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuotationRequest {
    #[validate(length(min = 1, message = "id_customer is required"))]
    pub id_customer: String,
    #[validate(length(min = 1, message = "order_date is required"))]
    pub order_date: String,
    pub payment: Option<String>,
    #[serde(default)]
    #[validate]
    pub products: Vec<PricedLineRequest>,
}

impl QuotationRequest {
    fn into_input(self) -> Result<QuotationInput, ServiceError> {
        Ok(QuotationInput {
            products: priced_lines(self.products)?,
            customer_id: self.id_customer,
            order_date: self.order_date,
            payment: self.payment,
        })
    }
}

async fn create_quotation(
    State(state): State<AppState>,
    Json(payload): Json<QuotationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let quotation = state
        .services
        .quotations
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!("Quotation created: {}", quotation.id);
    Ok(created_response(quotation))
}

async fn list_quotations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &state.services.quotations;
    let quotations = match params.view {
        ListSelection::All => service.list(params.page).await,
        ListSelection::Open => service.list_open(params.page).await,
        ListSelection::Billable => service.list_billable(params.page).await,
    }
    .map_err(map_service_error)?;

    Ok(success_response(PageResponse::new(quotations, params.page)))
}

async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .services
        .quotations
        .get(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(quotation))
}

async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<QuotationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let quotation = state
        .services
        .quotations
        .update(&id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(quotation))
}

async fn advance_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let quotation = state
        .services
        .quotations
        .advance_status(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(quotation))
}

async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .quotations
        .delete(&id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

async fn quotation_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state
        .services
        .quotations
        .overview(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(overview))
}
