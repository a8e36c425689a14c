mod common;

use assert_matches::assert_matches;
use common::*;
use erp_documents::config::DocumentsConfig;
use erp_documents::documents::status::RfqStatusTail;
use erp_documents::errors::ServiceError;
use erp_documents::models::{PricedLineInput, VendorBillInput};
use rust_decimal_macros::dec;

fn bill() -> VendorBillInput {
    VendorBillInput {
        bill_date: "2024-05-20".to_string(),
        payment: "bank transfer".to_string(),
    }
}

#[tokio::test]
async fn rfq_lines_take_material_names_and_computed_subtotals() {
    let app = TestApp::new().await;
    let rfq = app
        .services()
        .rfqs
        .create(rfq_input(vec![priced_line(STEEL, dec!(2), dec!(24.50))]))
        .await
        .unwrap();

    assert_eq!(rfq.id, "RFQ-00001");
    assert_eq!(rfq.status, "RFQ");
    assert_eq!(rfq.vendor_id, VENDOR);
    assert_eq!(rfq.products[0].id, "RQP-00001");
    assert_eq!(rfq.products[0].product_name, "Steel Frame");
    assert_eq!(rfq.products[0].subtotal, dec!(49.00));
}

#[tokio::test]
async fn update_upserts_by_material_and_keeps_unmentioned_lines() {
    let app = TestApp::new().await;
    let rfqs = &app.services().rfqs;
    let rfq = rfqs
        .create(rfq_input(vec![
            priced_line(STEEL, dec!(2), dec!(25)),
            priced_line(FABRIC, dec!(10), dec!(8)),
        ]))
        .await
        .unwrap();
    let steel_line = rfq
        .products
        .iter()
        .find(|line| line.product_id == STEEL)
        .unwrap()
        .id
        .clone();

    let change = rfq_input(vec![priced_line(STEEL, dec!(3), dec!(24))]);
    let once = rfqs.update(&rfq.id, change.clone()).await.unwrap();
    let twice = rfqs.update(&rfq.id, change).await.unwrap();

    assert_eq!(once.products, twice.products);
    assert_eq!(twice.products.len(), 2);
    let steel = twice
        .products
        .iter()
        .find(|line| line.product_id == STEEL)
        .unwrap();
    assert_eq!(steel.id, steel_line);
    assert_eq!(steel.quantity, dec!(3));
    assert_eq!(steel.unit_price, dec!(24));
    let fabric = twice
        .products
        .iter()
        .find(|line| line.product_id == FABRIC)
        .unwrap();
    assert_eq!(fabric.quantity, dec!(10));
}

#[tokio::test]
async fn open_and_billable_views_split_on_receipt() {
    let app = TestApp::new().await;
    let rfqs = &app.services().rfqs;
    let waiting = rfqs
        .create(rfq_input(vec![priced_line(STEEL, dec!(1), dec!(25))]))
        .await
        .unwrap();
    let received = rfqs
        .create(rfq_input(vec![priced_line(FABRIC, dec!(1), dec!(8))]))
        .await
        .unwrap();

    // open lists are cached before the status changes
    assert_eq!(rfqs.list_open(1).await.unwrap().len(), 2);

    rfqs.advance_status(&received.id).await.unwrap();
    let status = rfqs.advance_status(&received.id).await.unwrap().status;
    assert_eq!(status, "Received");

    let open: Vec<_> = rfqs
        .list_open(1)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    let billable: Vec<_> = rfqs
        .list_billable(1)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(open, vec![waiting.id]);
    assert_eq!(billable, vec![received.id]);
    assert_eq!(rfqs.list(1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn bills_need_received_goods_and_pin_the_rfq() {
    let app = TestApp::new().await;
    let services = app.services();
    let rfq = services
        .rfqs
        .create(rfq_input(vec![priced_line(STEEL, dec!(2), dec!(25))]))
        .await
        .unwrap();

    assert_matches!(
        services.vendor_bills.create_bill(&rfq.id, bill()).await,
        Err(ServiceError::InvalidTransition(_))
    );

    services.rfqs.advance_status(&rfq.id).await.unwrap();
    services.rfqs.advance_status(&rfq.id).await.unwrap();
    let created = services
        .vendor_bills
        .create_bill(&rfq.id, bill())
        .await
        .unwrap();
    assert_eq!(created.id, "BRQ-00001");
    assert_eq!(created.vendor_id, VENDOR);
    assert_eq!(created.rfq_id, rfq.id);

    let bills = services.vendor_bills.list_bills(&rfq.id).await.unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(services.rfqs.list_billable(1).await.unwrap().len(), 1);

    assert_matches!(
        services.rfqs.delete(&rfq.id).await,
        Err(ServiceError::Conflict(_))
    );
    assert_matches!(
        services.vendor_bills.list_bills("RFQ-00404").await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        services
            .vendor_bills
            .create_bill(
                &rfq.id,
                VendorBillInput {
                    payment: String::new(),
                    ..bill()
                }
            )
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn delete_removes_lines_and_header() {
    let app = TestApp::new().await;
    let rfqs = &app.services().rfqs;
    let rfq = rfqs
        .create(rfq_input(vec![priced_line(STEEL, dec!(2), dec!(25))]))
        .await
        .unwrap();

    rfqs.delete(&rfq.id).await.unwrap();

    assert_matches!(rfqs.get(&rfq.id).await, Err(ServiceError::NotFound(_)));
    assert_matches!(rfqs.delete(&rfq.id).await, Err(ServiceError::NotFound(_)));
    assert!(rfqs.list(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn billed_tail_inserts_a_billed_step() {
    let app = TestApp::with_documents(DocumentsConfig {
        rfq_status_tail: RfqStatusTail::Billed,
        ..DocumentsConfig::default()
    })
    .await;
    let rfqs = &app.services().rfqs;
    let rfq = rfqs
        .create(rfq_input(vec![priced_line(STEEL, dec!(1), dec!(25))]))
        .await
        .unwrap();

    let mut statuses = Vec::new();
    for _ in 0..4 {
        statuses.push(rfqs.advance_status(&rfq.id).await.unwrap().status.to_string());
    }
    assert_eq!(statuses, vec!["Purchase Order", "Received", "Billed", "Done"]);
    assert_matches!(
        rfqs.advance_status(&rfq.id).await,
        Err(ServiceError::InvalidTransition(_))
    );
}

#[tokio::test]
async fn overview_prices_lines_at_quoted_prices() {
    let app = TestApp::new().await;
    let rfqs = &app.services().rfqs;
    let rfq = rfqs
        .create(rfq_input(vec![
            priced_line(STEEL, dec!(2), dec!(24)),
            priced_line(FABRIC, dec!(4), dec!(7.50)),
        ]))
        .await
        .unwrap();

    let overview = rfqs.overview(&rfq.id).await.unwrap();
    assert_eq!(overview.total_cost, dec!(78.00));
    assert_eq!(overview.order_date.as_deref(), Some("2024-05-01"));
    let steel = overview
        .lines
        .iter()
        .find(|line| line.catalog_id == STEEL)
        .unwrap();
    assert_eq!(steel.catalog_price, Some(dec!(40.00)));
}

#[tokio::test]
async fn taxed_lines_count_in_full() {
    let app = TestApp::new().await;
    let rfqs = &app.services().rfqs;
    let taxed = PricedLineInput::new(STEEL, None, dec!(2), dec!(10.00), dec!(3.00), None).unwrap();
    let rfq = rfqs
        .create(rfq_input(vec![taxed, priced_line(FABRIC, dec!(1), dec!(5.50))]))
        .await
        .unwrap();
    assert_eq!(rfq.products[0].subtotal, dec!(23.00));

    let overview = rfqs.overview(&rfq.id).await.unwrap();
    assert_eq!(overview.lines[0].line_cost, dec!(23.00));
    assert_eq!(overview.total_cost, dec!(28.50));
    assert_eq!(overview.display_total, "Rp 28.50");
}

#[tokio::test]
async fn unknown_vendor_is_not_found() {
    let app = TestApp::new().await;
    let mut input = rfq_input(vec![priced_line(STEEL, dec!(1), dec!(25))]);
    input.vendor_id = "VDR-00404".to_string();

    assert_matches!(
        app.services().rfqs.create(input).await,
        Err(ServiceError::NotFound(msg)) if msg.contains("VDR-00404")
    );
}
