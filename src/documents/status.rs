//! Linear status tables, one per document kind.
//!
//! A document's status can only be produced by a [`StatusTable`]: either its
//! initial state on create, or one step forward through [`StatusTable::advance`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use strum::{Display, EnumString};

use super::DocumentKind;
use crate::errors::ServiceError;

pub mod mo_status {
    pub const DRAFT: &str = "draft";
    pub const CONFIRMED: &str = "confirmed";
    pub const ON_PROGRESS: &str = "on progress";
    pub const DONE: &str = "done";
}

pub mod bom_status {
    pub const DRAFT: &str = "draft";
    pub const ACTIVE: &str = "active";
}

pub mod rfq_status {
    pub const RFQ: &str = "RFQ";
    pub const PURCHASE_ORDER: &str = "Purchase Order";
    pub const RECEIVED: &str = "Received";
    pub const BILLED: &str = "Billed";
    pub const DONE: &str = "Done";
}

pub mod quotation_status {
    pub const QUOTATION: &str = "QUOTATION";
    pub const SALES_ORDER: &str = "Sales Order";
    pub const INVOICED: &str = "Invoiced";
    pub const DELIVERY: &str = "Delivery";
    pub const DONE: &str = "Done";
}

const BOM_STATES: &[&str] = &[bom_status::DRAFT, bom_status::ACTIVE];

const MO_STATES: &[&str] = &[
    mo_status::DRAFT,
    mo_status::CONFIRMED,
    mo_status::ON_PROGRESS,
    mo_status::DONE,
];

const RFQ_STANDARD_STATES: &[&str] = &[
    rfq_status::RFQ,
    rfq_status::PURCHASE_ORDER,
    rfq_status::RECEIVED,
    rfq_status::DONE,
];

const RFQ_BILLED_STATES: &[&str] = &[
    rfq_status::RFQ,
    rfq_status::PURCHASE_ORDER,
    rfq_status::RECEIVED,
    rfq_status::BILLED,
    rfq_status::DONE,
];

const QUOTATION_STANDARD_STATES: &[&str] = &[
    quotation_status::QUOTATION,
    quotation_status::SALES_ORDER,
    quotation_status::INVOICED,
    quotation_status::DONE,
];

const QUOTATION_DELIVERY_STATES: &[&str] = &[
    quotation_status::QUOTATION,
    quotation_status::SALES_ORDER,
    quotation_status::INVOICED,
    quotation_status::DELIVERY,
    quotation_status::DONE,
];

/// Which tail the RFQ table ends with
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RfqStatusTail {
    /// `Received -> Done`
    #[default]
    Standard,
    /// `Received -> Billed -> Done`
    Billed,
}

/// Which tail the quotation table ends with
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuotationStatusTail {
    /// `Invoiced -> Done`
    #[default]
    Standard,
    /// `Invoiced -> Delivery -> Done`
    Delivery,
}

/// A document status. Only a [`StatusTable`] can mint one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Status(String);

/// Deserialization only reads back documents that were stored before (cached
/// list pages), so it goes through the same path as a storage row.
impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Status::from_persisted)
    }
}

impl Status {
    /// Wraps a value read back from storage. Unknown values are kept verbatim
    /// and fail on the next advance.
    pub(crate) fn from_persisted(value: String) -> Self {
        Status(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Status {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The result of a successful advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Status,
    pub to: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTable {
    kind: DocumentKind,
    states: &'static [&'static str],
}

impl StatusTable {
    pub const BOM: StatusTable = StatusTable {
        kind: DocumentKind::Bom,
        states: BOM_STATES,
    };

    pub const MANUFACTURING_ORDER: StatusTable = StatusTable {
        kind: DocumentKind::ManufacturingOrder,
        states: MO_STATES,
    };

    pub fn rfq(tail: RfqStatusTail) -> Self {
        let states = match tail {
            RfqStatusTail::Standard => RFQ_STANDARD_STATES,
            RfqStatusTail::Billed => RFQ_BILLED_STATES,
        };
        StatusTable {
            kind: DocumentKind::Rfq,
            states,
        }
    }

    pub fn quotation(tail: QuotationStatusTail) -> Self {
        let states = match tail {
            QuotationStatusTail::Standard => QUOTATION_STANDARD_STATES,
            QuotationStatusTail::Delivery => QUOTATION_DELIVERY_STATES,
        };
        StatusTable {
            kind: DocumentKind::Quotation,
            states,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn states(&self) -> &'static [&'static str] {
        self.states
    }

    /// Status every new document of this kind starts in
    pub fn initial(&self) -> Status {
        Status(self.states[0].to_string())
    }

    pub fn terminal(&self) -> &'static str {
        self.states[self.states.len() - 1]
    }

    pub fn position(&self, status: &str) -> Option<usize> {
        self.states.iter().position(|s| *s == status)
    }

    /// States strictly before `marker`
    pub fn states_before(&self, marker: &str) -> Vec<&'static str> {
        self.states
            .iter()
            .copied()
            .take_while(|s| *s != marker)
            .collect()
    }

    /// `marker` and every state after it
    pub fn states_from(&self, marker: &str) -> Vec<&'static str> {
        self.states
            .iter()
            .copied()
            .skip_while(|s| *s != marker)
            .collect()
    }

    /// True when `current` sits at or beyond `marker` in this table.
    pub fn reached(&self, current: &Status, marker: &str) -> bool {
        match (self.position(current.as_str()), self.position(marker)) {
            (Some(at), Some(wanted)) => at >= wanted,
            _ => false,
        }
    }

    /// Moves one step forward. Fails for unknown statuses and for the
    /// terminal status.
    pub fn advance(&self, current: &Status) -> Result<Transition, ServiceError> {
        let position = self.position(current.as_str()).ok_or_else(|| {
            ServiceError::InvalidTransition(format!(
                "{} status '{}' is not part of the status table",
                self.kind, current
            ))
        })?;

        let next = self.states.get(position + 1).ok_or_else(|| {
            ServiceError::InvalidTransition(format!(
                "{} is already in terminal status '{}'",
                self.kind, current
            ))
        })?;

        Ok(Transition {
            from: current.clone(),
            to: Status(next.to_string()),
        })
    }
}
