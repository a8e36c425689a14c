//! Human-readable sequential identifiers of the form `PREFIX-00042`.
//!
//! The next id is always derived from the highest id issued so far for the
//! prefix; there is no separate counter table.

use std::fmt;
use thiserror::Error;

use crate::errors::ServiceError;

/// Width of the zero-padded numeric suffix
pub const SEQUENCE_WIDTH: usize = 5;
/// Largest suffix that still fits the display format
pub const MAX_SEQUENCE: u32 = 99_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdPrefix(&'static str);

impl IdPrefix {
    pub const BOM: IdPrefix = IdPrefix("BOM");
    pub const BOM_MATERIAL: IdPrefix = IdPrefix("BMM");
    pub const MANUFACTURING_ORDER: IdPrefix = IdPrefix("MO");
    pub const RFQ: IdPrefix = IdPrefix("RFQ");
    pub const RFQ_PRODUCT: IdPrefix = IdPrefix("RQP");
    pub const QUOTATION: IdPrefix = IdPrefix("QUO");
    pub const QUOTATION_PRODUCT: IdPrefix = IdPrefix("QPR");
    pub const VENDOR_BILL: IdPrefix = IdPrefix("BRQ");
    pub const PRODUCT: IdPrefix = IdPrefix("PRF");
    pub const MATERIAL: IdPrefix = IdPrefix("MTR");
    pub const VENDOR: IdPrefix = IdPrefix("VDR");
    pub const CUSTOMER: IdPrefix = IdPrefix("CSR");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Formats a sequence number with this prefix, e.g. `BOM-00001`.
    pub fn format(&self, sequence: u32) -> String {
        format!("{}-{:0width$}", self.0, sequence, width = SEQUENCE_WIDTH)
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("last issued id '{0}' has no numeric suffix")]
    Malformed(String),
    #[error("sequence for prefix {0} is exhausted")]
    Exhausted(&'static str),
}

impl From<SequenceError> for ServiceError {
    fn from(err: SequenceError) -> Self {
        ServiceError::DataIntegrity(err.to_string())
    }
}

/// Parses the trailing integer of an issued id. The prefix part is ignored.
pub fn parse_sequence(id: &str) -> Result<u32, SequenceError> {
    let suffix = id.rsplit('-').next().unwrap_or(id);
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SequenceError::Malformed(id.to_string()));
    }
    suffix
        .parse::<u32>()
        .map_err(|_| SequenceError::Malformed(id.to_string()))
}

/// Derives the id following `last_issued`. An empty `last_issued` starts the
/// sequence at `00001`.
pub fn next(prefix: IdPrefix, last_issued: &str) -> Result<String, SequenceError> {
    Ok(next_batch(prefix, last_issued, 1)?.remove(0))
}

/// Derives `count` consecutive ids following `last_issued`.
pub fn next_batch(
    prefix: IdPrefix,
    last_issued: &str,
    count: usize,
) -> Result<Vec<String>, SequenceError> {
    let last = if last_issued.trim().is_empty() {
        0
    } else {
        parse_sequence(last_issued)?
    };

    let count = u32::try_from(count).map_err(|_| SequenceError::Exhausted(prefix.as_str()))?;
    match last.checked_add(count) {
        Some(end) if end <= MAX_SEQUENCE => {
            Ok((last + 1..=end).map(|seq| prefix.format(seq)).collect())
        }
        _ => Err(SequenceError::Exhausted(prefix.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_last_id_starts_at_one() {
        assert_eq!(next(IdPrefix::BOM, "").unwrap(), "BOM-00001");
        assert_eq!(next(IdPrefix::MANUFACTURING_ORDER, "").unwrap(), "MO-00001");
    }

    #[rstest]
    #[case(IdPrefix::BOM, "BOM-00001", "BOM-00002")]
    #[case(IdPrefix::RFQ, "RFQ-00041", "RFQ-00042")]
    #[case(IdPrefix::QUOTATION, "QUO-00009", "QUO-00010")]
    #[case(IdPrefix::BOM_MATERIAL, "BMM-09999", "BMM-10000")]
    fn increments_trailing_integer(
        #[case] prefix: IdPrefix,
        #[case] last: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(next(prefix, last).unwrap(), expected);
    }

    #[test]
    fn prefix_of_last_id_is_ignored() {
        // legacy rows were minted with an "R-" prefix
        assert_eq!(next(IdPrefix::RFQ_PRODUCT, "R-00007").unwrap(), "RQP-00008");
    }

    #[test]
    fn malformed_last_id_is_an_integrity_error() {
        assert_eq!(
            next(IdPrefix::BOM, "BOM-ABCDE"),
            Err(SequenceError::Malformed("BOM-ABCDE".into()))
        );
        let err: ServiceError = SequenceError::Malformed("x".into()).into();
        assert!(matches!(err, ServiceError::DataIntegrity(_)));
    }

    #[test]
    fn exhausted_sequence_is_rejected() {
        assert_eq!(
            next(IdPrefix::MANUFACTURING_ORDER, "MO-99999"),
            Err(SequenceError::Exhausted("MO"))
        );
    }

    #[test]
    fn batch_continues_from_last_id() {
        assert_eq!(
            next_batch(IdPrefix::QUOTATION_PRODUCT, "QPR-00003", 3).unwrap(),
            vec!["QPR-00004", "QPR-00005", "QPR-00006"]
        );
        assert!(next_batch(IdPrefix::QUOTATION_PRODUCT, "", 0)
            .unwrap()
            .is_empty());
    }
}
