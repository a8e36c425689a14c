//! SeaORM entities. Identifiers are the prefixed display ids; quantities and
//! prices are stored as decimal strings.

pub mod bom;
pub mod bom_material;
pub mod customer;
pub mod manufacturing_order;
pub mod material;
pub mod product;
pub mod quotation;
pub mod quotation_product;
pub mod rfq;
pub mod rfq_product;
pub mod vendor;
pub mod vendor_bill;
