//! Building blocks shared by every order document: identifier minting,
//! status tables, line-item reconciliation, and cost rollup.

pub mod money;
pub mod reconcile;
pub mod rollup;
pub mod sequence;
pub mod status;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::ServiceError;

/// The document families that share the header + line-item lifecycle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[strum(serialize = "BOM")]
    Bom,
    #[strum(serialize = "Manufacturing order")]
    ManufacturingOrder,
    #[strum(serialize = "RFQ")]
    Rfq,
    #[strum(serialize = "Quotation")]
    Quotation,
    #[strum(serialize = "Vendor bill")]
    VendorBill,
}

/// Rejects blank required fields before anything touches storage.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

pub fn not_found(kind: DocumentKind, id: &str) -> ServiceError {
    ServiceError::NotFound(format!("{} with id {} does not exist", kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(require_non_empty("id_product", "PRF-00001").is_ok());
        assert!(matches!(
            require_non_empty("id_product", "   "),
            Err(ServiceError::ValidationError(msg)) if msg.contains("id_product")
        ));
    }

    #[test]
    fn not_found_names_the_document() {
        let err = not_found(DocumentKind::Rfq, "RFQ-00042");
        assert_eq!(
            err.to_string(),
            "Not found: RFQ with id RFQ-00042 does not exist"
        );
    }
}
