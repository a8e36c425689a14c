use super::common::{
    created_response, map_service_error, no_content_response, priced_lines, success_response,
    validate_input, ListParams, ListSelection, PageResponse, PricedLineRequest,
};
use crate::{
    errors::{ApiError, ServiceError},
    handlers::AppState,
    models::{RfqInput, VendorBillInput},
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

/// Creates the router for RFQ and vendor bill endpoints
pub fn rfq_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rfq).get(list_rfqs))
        .route("/:id", get(get_rfq).put(update_rfq).delete(delete_rfq))
        .route("/:id/advance", post(advance_rfq))
        .route("/:id/overview", get(rfq_overview))
        .route("/:id/bills", post(create_vendor_bill).get(list_vendor_bills))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RfqRequest {
    #[validate(length(min = 1, message = "id_vendor is required"))]
    pub id_vendor: String,
    #[validate(length(min = 1, message = "order_date is required"))]
    pub order_date: String,
    #[serde(default)]
    #[validate]
    pub products: Vec<PricedLineRequest>,
}

impl RfqRequest {
    fn into_input(self) -> Result<RfqInput, ServiceError> {
        Ok(RfqInput {
            products: priced_lines(self.products)?,
            vendor_id: self.id_vendor,
            order_date: self.order_date,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VendorBillRequest {
    #[validate(length(min = 1, message = "bill_date is required"))]
    pub bill_date: String,
    #[validate(length(min = 1, message = "payment is required"))]
    pub payment: String,
}

async fn create_rfq(
    State(state): State<AppState>,
    Json(payload): Json<RfqRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let rfq = state
        .services
        .rfqs
        .create(input)
        .await
        .map_err(map_service_error)?;

    info!("RFQ created: {}", rfq.id);
    Ok(created_response(rfq))
}

/// List RFQs; `view=open` or `view=billable` narrows by status
async fn list_rfqs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &state.services.rfqs;
    let rfqs = match params.view {
        ListSelection::All => service.list(params.page).await,
        ListSelection::Open => service.list_open(params.page).await,
        ListSelection::Billable => service.list_billable(params.page).await,
    }
    .map_err(map_service_error)?;

    Ok(success_response(PageResponse::new(rfqs, params.page)))
}

async fn get_rfq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rfq = state
        .services
        .rfqs
        .get(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rfq))
}

async fn update_rfq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RfqRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = payload.into_input().map_err(map_service_error)?;

    let rfq = state
        .services
        .rfqs
        .update(&id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rfq))
}

async fn advance_rfq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rfq = state
        .services
        .rfqs
        .advance_status(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rfq))
}

async fn delete_rfq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .rfqs
        .delete(&id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

async fn rfq_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state
        .services
        .rfqs
        .overview(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(overview))
}

/// Record a vendor bill against a received RFQ
async fn create_vendor_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<VendorBillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let bill = state
        .services
        .vendor_bills
        .create_bill(
            &id,
            VendorBillInput {
                bill_date: payload.bill_date,
                payment: payload.payment,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Vendor bill {} recorded for RFQ {}", bill.id, id);
    Ok(created_response(bill))
}

async fn list_vendor_bills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bills = state
        .services
        .vendor_bills
        .list_bills(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bills))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rfq_body_accepts_legacy_line_field_names() {
        let payload: RfqRequest = serde_json::from_str(
            r#"{
                "id_vendor": "VDR-00001",
                "order_date": "2024-05-01",
                "products": [{"id_product": "MTR-00001", "qty": "3", "unitprice": "12.50"}]
            }"#,
        )
        .unwrap();
        assert!(validate_input(&payload).is_ok());

        let input = payload.into_input().unwrap();
        assert_eq!(input.products[0].quantity, dec!(3));
        assert_eq!(input.products[0].unit_price, dec!(12.50));
        assert_eq!(input.products[0].subtotal, dec!(37.50));
    }

    #[test]
    fn bill_requires_date_and_payment() {
        let payload = VendorBillRequest {
            bill_date: String::new(),
            payment: "transfer".into(),
        };
        assert!(validate_input(&payload).is_err());
    }
}
