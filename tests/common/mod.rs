#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use erp_documents::{
    build_router,
    config::{AppConfig, DocumentsConfig},
    db,
    entities::{customer, material, product, vendor},
    models::{BomInput, BomMaterialInput, PricedLineInput, QuotationInput, RfqInput},
    services::AppServices,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

pub const CHAIR: &str = "PRF-00001";
pub const DESK: &str = "PRF-00002";
pub const STEEL: &str = "MTR-00001";
pub const FABRIC: &str = "MTR-00002";
pub const VENDOR: &str = "VDR-00001";
pub const CUSTOMER: &str = "CSR-00001";

/// Application over a private in-memory SQLite database with a seeded catalog.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_documents(DocumentsConfig::default()).await
    }

    pub async fn with_documents(documents: DocumentsConfig) -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());
        // one connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.documents = documents;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        seed_catalog(&pool).await;

        let state = AppState::new(Arc::new(pool), cfg);
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }
}

async fn seed_catalog(db: &DatabaseConnection) {
    let now: DateTime<FixedOffset> = Utc::now().into();

    for (id, name, sales_price, cost) in [
        (CHAIR, "Office Chair", "150.00", "90.00"),
        (DESK, "Standing Desk", "300.00", "200.00"),
    ] {
        product::ActiveModel {
            id_product: Set(id.to_string()),
            product_name: Set(name.to_string()),
            reference: Set(None),
            sales_price: Set(sales_price.to_string()),
            cost: Set(cost.to_string()),
            tax: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("seed product");
    }

    for (id, name, sales_price, cost) in [
        (STEEL, "Steel Frame", "40.00", "25.00"),
        (FABRIC, "Upholstery Fabric", "12.00", "8.50"),
    ] {
        material::ActiveModel {
            id_material: Set(id.to_string()),
            material_name: Set(name.to_string()),
            sales_price: Set(sales_price.to_string()),
            cost: Set(cost.to_string()),
            unit: Set(Some("pcs".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("seed material");
    }

    vendor::ActiveModel {
        id_vendor: Set(VENDOR.to_string()),
        vendor_name: Set("Sumber Baja".to_string()),
        email: Set(Some("sales@sumberbaja.example".to_string())),
        phone: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed vendor");

    customer::ActiveModel {
        id_customer: Set(CUSTOMER.to_string()),
        customer_name: Set("Acme Interiors".to_string()),
        email: Set(None),
        phone: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed customer");
}

pub fn bom_input(product_id: &str, materials: &[(&str, Decimal)]) -> BomInput {
    BomInput {
        product_id: product_id.to_string(),
        product_name: None,
        product_reference: None,
        quantity: Decimal::ONE,
        materials: materials
            .iter()
            .map(|(id, quantity)| BomMaterialInput {
                material_id: id.to_string(),
                material_name: None,
                quantity: *quantity,
                unit: None,
            })
            .collect(),
    }
}

pub fn priced_line(product_id: &str, quantity: Decimal, unit_price: Decimal) -> PricedLineInput {
    PricedLineInput::new(product_id, None, quantity, unit_price, Decimal::ZERO, None)
        .expect("line total fits")
}

pub fn rfq_input(lines: Vec<PricedLineInput>) -> RfqInput {
    RfqInput {
        vendor_id: VENDOR.to_string(),
        order_date: "2024-05-01".to_string(),
        products: lines,
    }
}

pub fn quotation_input(lines: Vec<PricedLineInput>) -> QuotationInput {
    QuotationInput {
        customer_id: CUSTOMER.to_string(),
        order_date: "2024-06-01".to_string(),
        payment: Some("transfer".to_string()),
        products: lines,
    }
}
