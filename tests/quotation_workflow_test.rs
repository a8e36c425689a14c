mod common;

use assert_matches::assert_matches;
use common::*;
use erp_documents::config::DocumentsConfig;
use erp_documents::documents::status::QuotationStatusTail;
use erp_documents::errors::ServiceError;
use erp_documents::models::PricedLineInput;
use rust_decimal_macros::dec;

#[tokio::test]
async fn quotation_snapshots_product_names_and_payment() {
    let app = TestApp::new().await;
    let quotation = app
        .services()
        .quotations
        .create(quotation_input(vec![priced_line(CHAIR, dec!(3), dec!(145))]))
        .await
        .unwrap();

    assert_eq!(quotation.id, "QUO-00001");
    assert_eq!(quotation.status, "QUOTATION");
    assert_eq!(quotation.payment.as_deref(), Some("transfer"));
    assert_eq!(quotation.products[0].id, "QPR-00001");
    assert_eq!(quotation.products[0].product_name, "Office Chair");
    assert_eq!(quotation.products[0].subtotal, dec!(435));
}

#[tokio::test]
async fn materials_are_not_sellable_products() {
    let app = TestApp::new().await;
    assert_matches!(
        app.services()
            .quotations
            .create(quotation_input(vec![priced_line(STEEL, dec!(1), dec!(40))]))
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn billable_view_starts_at_sales_order() {
    let app = TestApp::new().await;
    let quotations = &app.services().quotations;
    let draft = quotations
        .create(quotation_input(vec![priced_line(CHAIR, dec!(1), dec!(150))]))
        .await
        .unwrap();
    let ordered = quotations
        .create(quotation_input(vec![priced_line(DESK, dec!(1), dec!(300))]))
        .await
        .unwrap();
    quotations.advance_status(&ordered.id).await.unwrap();

    let billable: Vec<_> = quotations
        .list_billable(1)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(billable, vec![ordered.id.clone()]);

    let open = quotations.list_open(1).await.unwrap();
    assert_eq!(open.len(), 2);

    quotations.advance_status(&ordered.id).await.unwrap();
    let open: Vec<_> = quotations
        .list_open(1)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(open, vec![draft.id]);
}

#[tokio::test]
async fn delivery_tail_adds_a_delivery_step() {
    let app = TestApp::with_documents(DocumentsConfig {
        quotation_status_tail: QuotationStatusTail::Delivery,
        ..DocumentsConfig::default()
    })
    .await;
    let quotations = &app.services().quotations;
    let quotation = quotations
        .create(quotation_input(vec![priced_line(CHAIR, dec!(1), dec!(150))]))
        .await
        .unwrap();

    let mut statuses = Vec::new();
    for _ in 0..4 {
        statuses.push(
            quotations
                .advance_status(&quotation.id)
                .await
                .unwrap()
                .status
                .to_string(),
        );
    }
    assert_eq!(statuses, vec!["Sales Order", "Invoiced", "Delivery", "Done"]);
}

#[tokio::test]
async fn update_is_idempotent_and_delete_is_final() {
    let app = TestApp::new().await;
    let quotations = &app.services().quotations;
    let quotation = quotations
        .create(quotation_input(vec![
            priced_line(CHAIR, dec!(2), dec!(150)),
            priced_line(DESK, dec!(1), dec!(300)),
        ]))
        .await
        .unwrap();

    let mut change = quotation_input(vec![priced_line(DESK, dec!(2), dec!(280))]);
    change.payment = Some("cash".to_string());
    let once = quotations.update(&quotation.id, change.clone()).await.unwrap();
    let twice = quotations.update(&quotation.id, change).await.unwrap();
    assert_eq!(once.products, twice.products);
    assert_eq!(twice.products.len(), 2);
    assert_eq!(twice.payment.as_deref(), Some("cash"));

    let overview = quotations.overview(&quotation.id).await.unwrap();
    // chair 2 x 150 + desk 2 x 280
    assert_eq!(overview.total_cost, dec!(860));
    let desk = overview
        .lines
        .iter()
        .find(|line| line.catalog_id == DESK)
        .unwrap();
    assert_eq!(desk.catalog_price, Some(dec!(300.00)));

    quotations.delete(&quotation.id).await.unwrap();
    assert_matches!(
        quotations.get(&quotation.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        quotations.overview(&quotation.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn quoted_subtotal_is_what_the_customer_pays() {
    let app = TestApp::new().await;
    let quotations = &app.services().quotations;
    let discounted =
        PricedLineInput::new(DESK, None, dec!(2), dec!(300), dec!(33), Some(dec!(600))).unwrap();
    let quotation = quotations
        .create(quotation_input(vec![
            priced_line(CHAIR, dec!(1), dec!(150)),
            discounted,
        ]))
        .await
        .unwrap();

    let overview = quotations.overview(&quotation.id).await.unwrap();
    assert_eq!(overview.total_cost, dec!(750));
    assert_eq!(overview.display_total, "Rp 750.00");
}
