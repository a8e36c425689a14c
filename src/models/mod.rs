//! Hydrated documents. Rows are parsed into these once when read back from
//! storage; quantities and prices are decimals from here on.

pub mod bom;
pub mod manufacturing_order;
pub mod overview;
pub mod priced_line;
pub mod quotation;
pub mod rfq;
pub mod vendor_bill;

pub use bom::{Bom, BomInput, BomMaterial, BomMaterialInput};
pub use manufacturing_order::{ManufacturingOrder, ManufacturingOrderInput, ManufacturingOrderPatch};
pub use overview::{DocumentOverview, PriceDetails};
pub use priced_line::{PricedLine, PricedLineInput};
pub use quotation::{Quotation, QuotationInput};
pub use rfq::{Rfq, RfqInput};
pub use vendor_bill::{VendorBill, VendorBillInput};
