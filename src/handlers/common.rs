use crate::documents::money;
use crate::errors::{ApiError, ServiceError};
use crate::models::PricedLineInput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Which slice of a document list to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSelection {
    #[default]
    All,
    Open,
    Billable,
}

/// Query parameters of list endpoints. The page size is server-side
/// configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default)]
    pub view: ListSelection,
}

fn default_page() -> u64 {
    1
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            view: ListSelection::default(),
        }
    }
}

/// A page of documents
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub count: usize,
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>, page: u64) -> Self {
        Self {
            count: data.len(),
            data,
            page: page.max(1),
        }
    }
}

/// A priced line of an RFQ or quotation body. Amounts arrive as decimal
/// strings.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PricedLineRequest {
    #[validate(length(min = 1, message = "id_product is required"))]
    pub id_product: String,
    pub product_name: Option<String>,
    #[serde(alias = "qty")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub quantity: String,
    #[serde(alias = "unitprice")]
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub unit_price: String,
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub tax: Option<String>,
    #[validate(custom = "crate::documents::money::validate_decimal")]
    pub subtotal: Option<String>,
}

impl PricedLineRequest {
    pub fn into_input(self) -> Result<PricedLineInput, ServiceError> {
        let tax = match self.tax.as_deref() {
            Some(raw) => money::parse_amount("tax", raw)?,
            None => Decimal::ZERO,
        };
        let subtotal = self
            .subtotal
            .as_deref()
            .map(|raw| money::parse_amount("subtotal", raw))
            .transpose()?;

        PricedLineInput::new(
            self.id_product,
            self.product_name,
            money::parse_quantity("quantity", &self.quantity)?,
            money::parse_amount("unit_price", &self.unit_price)?,
            tax,
            subtotal,
        )
    }
}

pub fn priced_lines(lines: Vec<PricedLineRequest>) -> Result<Vec<PricedLineInput>, ServiceError> {
    lines.into_iter().map(PricedLineRequest::into_input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: &str, unit_price: &str) -> PricedLineRequest {
        PricedLineRequest {
            id_product: "MTR-00001".into(),
            product_name: None,
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            tax: None,
            subtotal: None,
        }
    }

    #[test]
    fn priced_line_parses_once_into_decimals() {
        let input = line("2", "10.00").into_input().unwrap();
        assert_eq!(input.quantity, dec!(2));
        assert_eq!(input.unit_price, dec!(10.00));
        assert_eq!(input.tax, Decimal::ZERO);
        assert_eq!(input.subtotal, dec!(20.00));
    }

    #[test]
    fn malformed_amounts_are_rejected_by_validation() {
        assert!(validate_input(&line("two", "10.00")).is_err());
        assert!(validate_input(&line("2", "10.00")).is_ok());
        assert!(matches!(
            line("0", "10.00").into_input(),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn huge_but_well_formed_amounts_fail_validation() {
        let result = line("79228162514264337593543950335", "2").into_input();
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn list_params_default_to_first_page_of_everything() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.view, ListSelection::All);

        let params: ListParams = serde_json::from_str(r#"{"page":3,"view":"billable"}"#).unwrap();
        assert_eq!(params.view, ListSelection::Billable);
    }
}
