use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::documents::{money, reconcile::LineItem};
use crate::entities::{quotation_product, rfq_product};
use crate::errors::ServiceError;

/// A priced line on an RFQ or a quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax: Decimal,
    pub subtotal: Decimal,
}

impl PricedLine {
    fn parse(
        id: String,
        product_id: String,
        product_name: String,
        quantity: &str,
        unit_price: &str,
        tax: &str,
        subtotal: &str,
    ) -> Result<Self, ServiceError> {
        let quantity = money::parse_persisted(&id, "quantity", quantity)?;
        let unit_price = money::parse_persisted(&id, "unit_price", unit_price)?;
        let tax = money::parse_persisted_or_zero(&id, "tax", tax)?;
        // rows written without a subtotal are totalled the way new lines are
        let subtotal = if subtotal.trim().is_empty() {
            unit_price
                .checked_mul(quantity)
                .and_then(|amount| amount.checked_add(tax))
                .ok_or_else(|| {
                    ServiceError::DataIntegrity(format!("subtotal of {} overflows", id))
                })?
        } else {
            money::parse_persisted(&id, "subtotal", subtotal)?
        };

        Ok(Self {
            id,
            product_id,
            product_name,
            quantity,
            unit_price,
            tax,
            subtotal,
        })
    }
}

impl TryFrom<rfq_product::Model> for PricedLine {
    type Error = ServiceError;

    fn try_from(row: rfq_product::Model) -> Result<Self, Self::Error> {
        Self::parse(
            row.id_rfq_product,
            row.id_product,
            row.product_name,
            &row.quantity,
            &row.unit_price,
            &row.tax,
            &row.subtotal,
        )
    }
}

impl TryFrom<quotation_product::Model> for PricedLine {
    type Error = ServiceError;

    fn try_from(row: quotation_product::Model) -> Result<Self, Self::Error> {
        Self::parse(
            row.id_quotation_product,
            row.id_product,
            row.product_name,
            &row.quantity,
            &row.unit_price,
            &row.tax,
            &row.subtotal,
        )
    }
}

/// Incoming priced line. The subtotal is settled on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLineInput {
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax: Decimal,
    pub subtotal: Decimal,
}

impl PricedLineInput {
    /// Builds a line, computing `unit_price * quantity + tax` when no
    /// subtotal is given. A total that overflows is a validation error.
    pub fn new(
        product_id: impl Into<String>,
        product_name: Option<String>,
        quantity: Decimal,
        unit_price: Decimal,
        tax: Decimal,
        subtotal: Option<Decimal>,
    ) -> Result<Self, ServiceError> {
        let product_id = product_id.into();
        let subtotal = match subtotal {
            Some(subtotal) => subtotal,
            None => unit_price
                .checked_mul(quantity)
                .and_then(|amount| amount.checked_add(tax))
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "subtotal of line {} is out of range",
                        product_id
                    ))
                })?,
        };

        Ok(Self {
            product_id,
            product_name,
            quantity,
            unit_price,
            tax,
            subtotal,
        })
    }
}

impl LineItem for PricedLineInput {
    fn catalog_id(&self) -> &str {
        &self.product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn row(quantity: &str, unit_price: &str) -> rfq_product::Model {
        row_with_subtotal(quantity, unit_price, "20.00")
    }

    fn row_with_subtotal(quantity: &str, unit_price: &str, subtotal: &str) -> rfq_product::Model {
        rfq_product::Model {
            id_rfq_product: "RQP-00001".into(),
            id_rfq: "RFQ-00001".into(),
            id_product: "MTR-00001".into(),
            id_vendor: "VDR-00001".into(),
            product_name: "Steel sheet".into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            tax: "".into(),
            subtotal: subtotal.into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn parses_row_into_decimals() {
        let line = PricedLine::try_from(row("2", "10.00")).unwrap();
        assert_eq!(line.quantity, dec!(2));
        assert_eq!(line.unit_price, dec!(10.00));
        assert_eq!(line.tax, Decimal::ZERO);
        assert_eq!(line.subtotal, dec!(20.00));

        let legacy = PricedLine::try_from(row_with_subtotal("2", "10.00", "")).unwrap();
        assert_eq!(legacy.subtotal, dec!(20.00));
    }

    #[test]
    fn corrupt_price_names_the_line() {
        let err = PricedLine::try_from(row("2", "Rp 10")).unwrap_err();
        assert!(matches!(err, ServiceError::DataIntegrity(msg) if msg.contains("RQP-00001")));
    }

    fn three_at(unit_price: Decimal, tax: Decimal, subtotal: Option<Decimal>) -> PricedLineInput {
        PricedLineInput::new("PRF-00001", None, dec!(3), unit_price, tax, subtotal).unwrap()
    }

    #[test]
    fn subtotal_defaults_to_price_times_quantity_plus_tax() {
        assert_eq!(three_at(dec!(2.50), dec!(0.75), None).subtotal, dec!(8.25));
        assert_eq!(three_at(dec!(2.50), dec!(0), Some(dec!(7))).subtotal, dec!(7));
    }

    #[test]
    fn overflowing_subtotal_is_rejected() {
        let result = PricedLineInput::new("MTR-00001", None, Decimal::MAX, dec!(2), dec!(0), None);
        assert!(matches!(
            result,
            Err(ServiceError::ValidationError(msg)) if msg.contains("MTR-00001")
        ));
    }
}
