//! Decimal parsing at the storage and request boundaries.
//!
//! Quantities and prices are persisted as strings. They become [`Decimal`]
//! exactly once on the way in and are formatted back only when written.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use validator::ValidationError;

use crate::errors::ServiceError;

fn parse(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Parses a request value. Failures are validation errors naming the field.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ServiceError> {
    let value = parse(raw).ok_or_else(|| {
        ServiceError::ValidationError(format!("{} '{}' is not a decimal number", field, raw))
    })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(value)
}

/// Parses a request quantity, which must be strictly positive.
pub fn parse_quantity(field: &str, raw: &str) -> Result<Decimal, ServiceError> {
    let value = parse_amount(field, raw)?;
    if value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(value)
}

/// Rejects zero or negative quantities arriving through a typed input.
pub fn require_positive(field: &str, value: Decimal) -> Result<(), ServiceError> {
    if value <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}

/// Parses a value read back from storage. A failure means the row is
/// corrupt, so the error names the owning record.
pub fn parse_persisted(record_id: &str, field: &str, raw: &str) -> Result<Decimal, ServiceError> {
    parse(raw).ok_or_else(|| {
        ServiceError::DataIntegrity(format!(
            "{} of {} holds '{}', which is not a decimal number",
            field, record_id, raw
        ))
    })
}

/// Like [`parse_persisted`] but an empty column reads as zero.
pub fn parse_persisted_or_zero(
    record_id: &str,
    field: &str,
    raw: &str,
) -> Result<Decimal, ServiceError> {
    if raw.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_persisted(record_id, field, raw)
}

/// Storage representation. Keeps the scale the value arrived with.
pub fn to_storage(value: Decimal) -> String {
    value.to_string()
}

/// Display form used on overviews, e.g. `Rp 25.50`.
pub fn display_rupiah(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("Rp {:.2}", rounded)
}

/// `validator` hook for decimal string fields on request bodies.
pub fn validate_decimal(raw: &str) -> Result<(), ValidationError> {
    match parse(raw) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("decimal");
            err.message = Some("Must be a decimal number".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_request_amounts() {
        assert_eq!(parse_amount("unitprice", "10.00").unwrap(), dec!(10.00));
        assert_eq!(parse_amount("tax", " 0 ").unwrap(), Decimal::ZERO);
        assert!(matches!(
            parse_amount("unitprice", "ten"),
            Err(ServiceError::ValidationError(msg)) if msg.contains("unitprice")
        ));
        assert!(matches!(
            parse_amount("unitprice", "-1"),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn quantity_must_be_positive() {
        assert_eq!(parse_quantity("quantity", "2").unwrap(), dec!(2));
        assert!(parse_quantity("quantity", "0").is_err());
        assert!(parse_quantity("quantity", "").is_err());
        assert!(require_positive("qty_to_produce", dec!(-1)).is_err());
        assert!(require_positive("qty_to_produce", dec!(0.5)).is_ok());
    }

    #[test]
    fn persisted_failure_names_the_record() {
        let err = parse_persisted("BMM-00003", "quantity", "2kg").unwrap_err();
        assert!(matches!(&err, ServiceError::DataIntegrity(msg) if msg.contains("BMM-00003")));
        assert_eq!(
            parse_persisted_or_zero("MTR-00001", "cost", "").unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn storage_keeps_scale() {
        assert_eq!(to_storage(dec!(10.00)), "10.00");
        assert_eq!(to_storage(dec!(5.5)), "5.5");
    }

    #[test]
    fn rupiah_display_has_two_decimals() {
        assert_eq!(display_rupiah(dec!(25.5)), "Rp 25.50");
        assert_eq!(display_rupiah(dec!(1.005)), "Rp 1.01");
        assert_eq!(display_rupiah(Decimal::ZERO), "Rp 0.00");
    }
}
