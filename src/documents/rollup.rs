//! Cost rollup: per-line cost summed into a total. A line costs its stated
//! amount when it carries one, `unit_value * quantity` otherwise.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// One line fed into the rollup, already resolved to decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct CostInput {
    pub line_item_id: String,
    pub catalog_id: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    /// Stored line total (priced lines carry their tax in it)
    pub stated_cost: Option<Decimal>,
    /// Catalog price shown next to the line; never part of the total
    pub catalog_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub line_item_id: String,
    pub catalog_id: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub line_cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRollup {
    pub lines: Vec<CostLine>,
    pub total: Decimal,
}

/// Rolls the inputs up. Arithmetic overflow fails the whole rollup and names
/// the line that caused it.
pub fn roll_up<I>(inputs: I) -> Result<CostRollup, ServiceError>
where
    I: IntoIterator<Item = CostInput>,
{
    let mut total = Decimal::ZERO;
    let mut lines = Vec::new();

    for input in inputs {
        let overflow = || {
            ServiceError::DataIntegrity(format!(
                "cost of line item {} overflows",
                input.line_item_id
            ))
        };
        let line_cost = match input.stated_cost {
            Some(cost) => cost,
            None => input
                .unit_value
                .checked_mul(input.quantity)
                .ok_or_else(overflow)?,
        };
        total = total.checked_add(line_cost).ok_or_else(overflow)?;

        lines.push(CostLine {
            line_item_id: input.line_item_id,
            catalog_id: input.catalog_id,
            name: input.name,
            quantity: input.quantity,
            unit_value: input.unit_value,
            line_cost,
            catalog_price: input.catalog_price,
        });
    }

    Ok(CostRollup { lines, total })
}
