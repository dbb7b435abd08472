use super::*;
use crate::adapters::{FixedThreshold, InMemoryLedgerRepository};
use proptest::prelude::*;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use shared_types::{Address, CustomerInfo, Money, OrderId, OrderLine, ValidationError};

type Service = InventoryService<InMemoryLedgerRepository, FixedThreshold>;

struct Harness {
    service: Service,
    repo: Arc<InMemoryLedgerRepository>,
    events: Subscription,
    _bus: Arc<InMemoryEventBus>,
}

fn harness(threshold: i64) -> Harness {
    let bus = Arc::new(InMemoryEventBus::new());
    let events = bus.subscribe(EventFilter::all());
    let repo = Arc::new(InMemoryLedgerRepository::new());
    let service = InventoryService::new(
        InventoryConfig::default(),
        repo.clone(),
        Arc::new(FixedThreshold(threshold)),
        bus.clone(),
    );
    Harness {
        service,
        repo,
        events,
        _bus: bus,
    }
}

fn drain(sub: &mut Subscription) -> Vec<StoreEvent> {
    let mut out = Vec::new();
    while let Ok(Some(event)) = sub.try_recv() {
        out.push(event);
    }
    out
}

fn restock(product_id: ProductId, quantity: i64) -> NewMovement {
    NewMovement {
        product_id,
        kind: MovementKind::In,
        quantity,
        reason: MovementReason::Restock,
        reference: None,
        note: Some("supplier delivery".into()),
        created_by: Some("admin@aurelia.test".into()),
    }
}

fn damaged(product_id: ProductId, quantity: i64) -> NewMovement {
    NewMovement {
        product_id,
        kind: MovementKind::Out,
        quantity,
        reason: MovementReason::Damaged,
        reference: None,
        note: None,
        created_by: None,
    }
}

fn order(lines: &[(ProductId, u32)]) -> OrderSummary {
    let lines: Vec<OrderLine> = lines
        .iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id: *product_id,
            name: "Pearl Studs".into(),
            sku: None,
            unit_price: Money::usd(4_500),
            quantity: *quantity,
        })
        .collect();
    OrderSummary {
        order_id: OrderId::new(),
        order_number: "AU-20261019-7KQ2ZD".into(),
        customer: CustomerInfo {
            email: "ines@example.com".into(),
            name: "Ines".into(),
            phone: None,
        },
        lines,
        subtotal: Money::usd(0),
        shipping: Money::usd(0),
        total: Money::usd(0),
        shipping_address: Address::default(),
    }
}

// =============================================================================
// Manual movements
// =============================================================================

#[tokio::test]
async fn test_restock_increments_and_announces() {
    let mut h = harness(2);
    let product = ProductId::new();

    let movement = h.service.record_movement(restock(product, 10)).await.unwrap();

    assert_eq!(movement.delta(), 10);
    assert_eq!(h.service.stock_level(product).await.unwrap(), 10);
    let events = drain(&mut h.events);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StoreEvent::StockChanged { level: 10, .. }));
}

#[tokio::test]
async fn test_decrement_below_zero_rejected() {
    let h = harness(2);
    let product = ProductId::new();
    h.service.record_movement(restock(product, 2)).await.unwrap();

    let result = h.service.record_movement(damaged(product, 3)).await;
    assert!(matches!(
        result,
        Err(InventoryError::InsufficientStock {
            available: 2,
            requested: 3,
            ..
        })
    ));
    // Rejected movements leave no trace.
    assert_eq!(h.repo.len(), 1);
}

#[tokio::test]
async fn test_negative_adjustment_checked() {
    let h = harness(0);
    let product = ProductId::new();
    h.service.record_movement(restock(product, 1)).await.unwrap();

    let adjustment = NewMovement {
        product_id: product,
        kind: MovementKind::Adjustment,
        quantity: -2,
        reason: MovementReason::Correction,
        reference: None,
        note: None,
        created_by: None,
    };
    assert!(matches!(
        h.service.record_movement(adjustment).await,
        Err(InventoryError::InsufficientStock { .. })
    ));
}

#[tokio::test]
async fn test_manual_sale_rejected() {
    let h = harness(0);
    let sale = NewMovement {
        product_id: ProductId::new(),
        kind: MovementKind::Out,
        quantity: 1,
        reason: MovementReason::Sale,
        reference: None,
        note: None,
        created_by: None,
    };
    assert!(matches!(
        h.service.record_movement(sale).await,
        Err(InventoryError::Validation(ValidationError::Invalid(_)))
    ));
}

#[tokio::test]
async fn test_low_stock_event_at_threshold() {
    let mut h = harness(3);
    let product = ProductId::new();
    h.service.record_movement(restock(product, 5)).await.unwrap();
    drain(&mut h.events);

    h.service.record_movement(damaged(product, 2)).await.unwrap();

    let events = drain(&mut h.events);
    assert!(matches!(events[0], StoreEvent::StockChanged { level: 3, .. }));
    assert!(matches!(
        events[1],
        StoreEvent::LowStock {
            level: 3,
            threshold: 3,
            ..
        }
    ));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_record_sale_is_idempotent_per_order() {
    let h = harness(0);
    let ring = ProductId::new();
    let chain = ProductId::new();
    h.service.record_movement(restock(ring, 5)).await.unwrap();
    h.service.record_movement(restock(chain, 5)).await.unwrap();

    let paid = order(&[(ring, 2), (chain, 1)]);
    let first = h.service.record_sale(&paid).await.unwrap();
    let second = h.service.record_sale(&paid).await.unwrap();

    assert_eq!(first.recorded.len(), 2);
    assert!(second.recorded.is_empty());
    assert_eq!(second.skipped, 2);
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 3);
    assert_eq!(h.service.stock_level(chain).await.unwrap(), 4);
}

#[tokio::test]
async fn test_duplicate_lines_merge_into_one_movement() {
    let h = harness(0);
    let ring = ProductId::new();
    h.service.record_movement(restock(ring, 5)).await.unwrap();

    let outcome = h.service.record_sale(&order(&[(ring, 1), (ring, 2)])).await.unwrap();

    assert_eq!(outcome.recorded.len(), 1);
    assert_eq!(outcome.recorded[0].quantity, 3);
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 2);
}

#[tokio::test]
async fn test_oversold_sale_recorded_with_low_stock() {
    let mut h = harness(1);
    let ring = ProductId::new();
    h.service.record_movement(restock(ring, 1)).await.unwrap();
    drain(&mut h.events);

    let outcome = h.service.record_sale(&order(&[(ring, 3)])).await.unwrap();

    assert_eq!(outcome.recorded.len(), 1);
    assert_eq!(h.service.stock_level(ring).await.unwrap(), -2);
    let events = drain(&mut h.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, StoreEvent::LowStock { level: -2, .. })));
}

#[tokio::test]
async fn test_return_requires_prior_sale() {
    let h = harness(0);
    let ring = ProductId::new();
    h.service.record_movement(restock(ring, 4)).await.unwrap();

    let never_sold = order(&[(ring, 1)]);
    let outcome = h.service.record_return(&never_sold).await.unwrap();
    assert!(outcome.recorded.is_empty());
    assert_eq!(outcome.skipped, 1);
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 4);
}

#[tokio::test]
async fn test_return_restores_sold_quantity_once() {
    let h = harness(0);
    let ring = ProductId::new();
    h.service.record_movement(restock(ring, 4)).await.unwrap();

    let paid = order(&[(ring, 3)]);
    h.service.record_sale(&paid).await.unwrap();
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 1);

    let first = h.service.record_return(&paid).await.unwrap();
    let second = h.service.record_return(&paid).await.unwrap();

    assert_eq!(first.recorded.len(), 1);
    assert_eq!(first.recorded[0].kind, MovementKind::In);
    assert!(second.recorded.is_empty());
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 4);
}

// =============================================================================
// Queries and recompute
// =============================================================================

#[tokio::test]
async fn test_movements_newest_first() {
    let h = harness(0);
    let ring = ProductId::new();
    for q in 1..=3 {
        h.service.record_movement(restock(ring, q)).await.unwrap();
    }

    let history = h.service.movements(ring, 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].quantity, 3);
    assert_eq!(history[1].quantity, 2);
}

#[tokio::test]
async fn test_stock_levels_default_zero() {
    let h = harness(0);
    let known = ProductId::new();
    let unknown = ProductId::new();
    h.service.record_movement(restock(known, 2)).await.unwrap();

    let levels = h.service.stock_levels(&[known, unknown]).await.unwrap();
    assert_eq!(levels[0].level, 2);
    assert_eq!(levels[1].level, 0);
}

#[tokio::test]
async fn test_recompute_repairs_drift() {
    let mut h = harness(0);
    let ring = ProductId::new();
    h.service.record_movement(restock(ring, 6)).await.unwrap();
    h.service.record_movement(damaged(ring, 1)).await.unwrap();
    h.repo.force_level(ring, 42);
    drain(&mut h.events);

    let report = h.service.recompute(ring).await.unwrap();

    assert!(report.drifted());
    assert_eq!(report.previous, 42);
    assert_eq!(report.recomputed, 5);
    assert_eq!(report.movements, 2);
    assert_eq!(h.service.stock_level(ring).await.unwrap(), 5);
    assert!(matches!(
        drain(&mut h.events)[0],
        StoreEvent::StockChanged { level: 5, .. }
    ));
}

#[tokio::test]
async fn test_low_stock_sorted_ascending() {
    let h = harness(0);
    let a = ProductId::new();
    let b = ProductId::new();
    let c = ProductId::new();
    h.service.record_movement(restock(a, 2)).await.unwrap();
    h.service.record_movement(restock(b, 1)).await.unwrap();
    h.service.record_movement(restock(c, 9)).await.unwrap();

    let low = h.service.low_stock(2).await.unwrap();
    assert_eq!(low.len(), 2);
    assert_eq!(low[0].product_id, b);
    assert_eq!(low[1].product_id, a);
}

#[tokio::test]
async fn test_oversized_and_overflowing_movements_are_rejected() {
    let mut h = harness(0);
    let chain = ProductId::new();

    assert!(matches!(
        h.service.record_movement(restock(chain, i64::MAX)).await,
        Err(InventoryError::Validation(_))
    ));
    assert_eq!(h.service.stock_level(chain).await.unwrap(), 0);

    // A level already at the edge refuses to move past it.
    h.repo.force_level(chain, i64::MAX - 1);
    drain(&mut h.events);
    assert!(matches!(
        h.service.record_movement(restock(chain, 5)).await,
        Err(InventoryError::LevelOverflow { product_id }) if product_id == chain
    ));
    assert_eq!(h.service.stock_level(chain).await.unwrap(), i64::MAX - 1);
    assert!(h.repo.is_empty());
    assert!(drain(&mut h.events).is_empty());
}

// =============================================================================
// Ledger invariant
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Restock(i64),
    Damage(i64),
    Adjust(i64),
    Sale(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..20).prop_map(Op::Restock),
        (1i64..20).prop_map(Op::Damage),
        (-10i64..10)
            .prop_filter("non-zero", |q| *q != 0)
            .prop_map(Op::Adjust),
        (1u32..5).prop_map(Op::Sale),
    ]
}

proptest! {
    #[test]
    fn prop_incremental_level_matches_replay(ops in prop::collection::vec(op(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let h = harness(0);
            let product = ProductId::new();

            for op in ops {
                let before = h.service.stock_level(product).await.unwrap();
                match op {
                    Op::Restock(q) => {
                        h.service.record_movement(restock(product, q)).await.unwrap();
                    }
                    Op::Damage(q) => {
                        let result = h.service.record_movement(damaged(product, q)).await;
                        prop_assert_eq!(result.is_ok(), before - q >= 0);
                    }
                    Op::Adjust(q) => {
                        let adjustment = NewMovement {
                            product_id: product,
                            kind: MovementKind::Adjustment,
                            quantity: q,
                            reason: MovementReason::Correction,
                            reference: None,
                            note: None,
                            created_by: None,
                        };
                        let result = h.service.record_movement(adjustment).await;
                        prop_assert_eq!(result.is_ok(), q > 0 || before + q >= 0);
                    }
                    Op::Sale(q) => {
                        h.service.record_sale(&order(&[(product, q)])).await.unwrap();
                    }
                }
            }

            let incremental = h.service.stock_level(product).await.unwrap();
            let report = h.service.recompute(product).await.unwrap();
            prop_assert_eq!(report.recomputed, incremental);
            prop_assert!(!report.drifted());
            Ok(())
        })?;
    }
}
