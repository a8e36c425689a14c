mod common;

use assert_matches::assert_matches;
use common::*;
use erp_documents::errors::ServiceError;
use erp_documents::models::{BomInput, ManufacturingOrderInput, ManufacturingOrderPatch};
use rust_decimal_macros::dec;

fn order(bom_id: &str, qty: rust_decimal::Decimal) -> ManufacturingOrderInput {
    ManufacturingOrderInput {
        product_id: CHAIR.to_string(),
        bom_id: bom_id.to_string(),
        qty_to_produce: qty,
    }
}

#[tokio::test]
async fn order_runs_through_its_statuses_once() {
    let app = TestApp::new().await;
    let services = app.services();
    let bom = services
        .boms
        .create(bom_input(CHAIR, &[(STEEL, dec!(2))]))
        .await
        .unwrap();

    let mo = services
        .manufacturing_orders
        .create(order(&bom.id, dec!(4)))
        .await
        .unwrap();
    assert_eq!(mo.id, "MO-00001");
    assert_eq!(mo.status, "draft");
    assert_eq!(mo.qty_to_produce, dec!(4));

    let mut seen = Vec::new();
    for _ in 0..3 {
        let advanced = services
            .manufacturing_orders
            .advance_status(&mo.id)
            .await
            .unwrap();
        seen.push(advanced.status.to_string());
    }
    assert_eq!(seen, vec!["confirmed", "on progress", "done"]);

    assert_matches!(
        services.manufacturing_orders.advance_status(&mo.id).await,
        Err(ServiceError::InvalidTransition(_))
    );
}

#[tokio::test]
async fn bom_must_exist_and_describe_the_ordered_product() {
    let app = TestApp::new().await;
    let services = app.services();
    let desk_bom = services
        .boms
        .create(bom_input(DESK, &[(STEEL, dec!(4))]))
        .await
        .unwrap();

    assert_matches!(
        services
            .manufacturing_orders
            .create(order(&desk_bom.id, dec!(1)))
            .await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        services
            .manufacturing_orders
            .create(order("BOM-00077", dec!(1)))
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        services
            .manufacturing_orders
            .create(order(&desk_bom.id, dec!(0)))
            .await,
        Err(ServiceError::ValidationError(_))
    );
    assert!(services.manufacturing_orders.list(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn overview_scales_bom_materials_to_the_order_quantity() {
    let app = TestApp::new().await;
    let services = app.services();
    let bom = services
        .boms
        .create(BomInput {
            quantity: dec!(2),
            ..bom_input(CHAIR, &[(STEEL, dec!(2)), (FABRIC, dec!(1))])
        })
        .await
        .unwrap();
    let mo = services
        .manufacturing_orders
        .create(order(&bom.id, dec!(4)))
        .await
        .unwrap();

    let overview = services.manufacturing_orders.overview(&mo.id).await.unwrap();

    // steel 4 x 25.00 + fabric 2 x 8.50
    assert_eq!(overview.total_cost, dec!(117.00));
    assert_eq!(overview.lines.len(), 2);
    assert_eq!(overview.subject_id, CHAIR);
}

#[tokio::test]
async fn patch_keeps_whatever_it_does_not_mention() {
    let app = TestApp::new().await;
    let services = app.services();
    let first = services
        .boms
        .create(bom_input(CHAIR, &[(STEEL, dec!(2))]))
        .await
        .unwrap();
    let second = services
        .boms
        .create(bom_input(CHAIR, &[(FABRIC, dec!(6))]))
        .await
        .unwrap();
    let mo = services
        .manufacturing_orders
        .create(order(&first.id, dec!(3)))
        .await
        .unwrap();

    let updated = services
        .manufacturing_orders
        .update(
            &mo.id,
            ManufacturingOrderPatch {
                qty_to_produce: Some(dec!(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bom_id, first.id);
    assert_eq!(updated.qty_to_produce, dec!(10));

    let updated = services
        .manufacturing_orders
        .update(
            &mo.id,
            ManufacturingOrderPatch {
                bom_id: Some(second.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bom_id, second.id);
    assert_eq!(updated.qty_to_produce, dec!(10));
    assert_eq!(updated.status, "draft");
}
