mod common;

use axum::http::{Method, StatusCode};
use common::*;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_endpoints_report_up() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
async fn bom_round_trip_over_http() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/v1/boms",
            Some(json!({
                "id_product": CHAIR,
                "materials": [{"id_material": STEEL, "qty": "2"}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "BOM-00001");
    assert_eq!(created["status"], "draft");

    let (status, page) = app.request(Method::GET, "/api/v1/boms?page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"][0]["id"], "BOM-00001");

    let (status, advanced) = app
        .request(Method::POST, "/api/v1/boms/BOM-00001/advance", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(advanced["status"], "active");

    let (status, overview) = app
        .request(Method::GET, "/api/v1/boms/BOM-00001/overview", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["lines"].as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .request(Method::DELETE, "/api/v1/boms/BOM-00001", None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn errors_use_the_shared_error_body() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/boms/BOM-00009", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("BOM-00009"));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/boms",
            Some(json!({
                "id_product": CHAIR,
                "materials": [{"id_material": STEEL, "quantity": "two"}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/boms",
            Some(json!({
                "id_product": CHAIR,
                "materials": [
                    {"id_material": STEEL, "quantity": "1"},
                    {"id_material": STEEL, "quantity": "2"}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(Method::GET, "/api/v1/boms?page=18446744073709551615", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn rfq_views_and_bills_over_http() {
    let app = TestApp::new().await;

    let (status, rfq) = app
        .request(
            Method::POST,
            "/api/v1/rfqs",
            Some(json!({
                "id_vendor": VENDOR,
                "order_date": "2024-05-01",
                "products": [{"id_product": STEEL, "quantity": "2", "unitprice": "25"}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rfq["id"], "RFQ-00001");

    let bill = json!({"bill_date": "2024-05-20", "payment": "transfer"});
    let (status, _) = app
        .request(Method::POST, "/api/v1/rfqs/RFQ-00001/bills", Some(bill.clone()))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, open) = app.request(Method::GET, "/api/v1/rfqs?view=open", None).await;
    assert_eq!(open["count"], 1);

    for _ in 0..2 {
        let (status, _) = app
            .request(Method::POST, "/api/v1/rfqs/RFQ-00001/advance", None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, created) = app
        .request(Method::POST, "/api/v1/rfqs/RFQ-00001/bills", Some(bill))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "BRQ-00001");

    let (_, billable) = app
        .request(Method::GET, "/api/v1/rfqs?view=billable", None)
        .await;
    assert_eq!(billable["count"], 1);
    let (_, open) = app.request(Method::GET, "/api/v1/rfqs?view=open", None).await;
    assert_eq!(open["count"], 0);

    let (status, bills) = app
        .request(Method::GET, "/api/v1/rfqs/RFQ-00001/bills", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bills.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn manufacturing_orders_and_quotations_are_mounted() {
    let app = TestApp::new().await;
    app.services()
        .boms
        .create(bom_input(CHAIR, &[(STEEL, dec!(2))]))
        .await
        .unwrap();

    let (status, mo) = app
        .request(
            Method::POST,
            "/api/v1/manufacturing-orders",
            Some(json!({"id_product": CHAIR, "id_bom": "BOM-00001", "qty_to_produce": "3"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(mo["id"], "MO-00001");

    let (status, patched) = app
        .request(
            Method::PUT,
            "/api/v1/manufacturing-orders/MO-00001",
            Some(json!({"qty": "5"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["bom_id"], "BOM-00001");
    assert_eq!(patched["qty_to_produce"], "5");

    let (status, quotation) = app
        .request(
            Method::POST,
            "/api/v1/quotations",
            Some(json!({
                "id_customer": CUSTOMER,
                "order_date": "2024-06-01",
                "products": [{"id_product": CHAIR, "qty": "1", "unit_price": "150"}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(quotation["id"], "QUO-00001");

    let (status, _) = app
        .request(Method::GET, "/api/v1/quotations?view=billable", None)
        .await;
    assert_eq!(status, StatusCode::OK);
}
