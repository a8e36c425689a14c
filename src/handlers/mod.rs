pub mod boms;
pub mod common;
pub mod health;
pub mod manufacturing_orders;
pub mod quotations;
pub mod rfqs;

use axum::Router;

pub use crate::AppState;

/// Document API routes, mounted under `/api/v1`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/boms", boms::bom_routes())
        .nest("/manufacturing-orders", manufacturing_orders::manufacturing_order_routes())
        .nest("/rfqs", rfqs::rfq_routes())
        .nest("/quotations", quotations::quotation_routes())
}
