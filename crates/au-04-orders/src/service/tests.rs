use super::*;
use crate::adapters::InMemoryOrderRepository;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use shared_types::{Address, Money, OrderLine};

struct Harness {
    service: OrderService<InMemoryOrderRepository>,
    events: Subscription,
    _bus: Arc<InMemoryEventBus>,
}

fn harness() -> Harness {
    let bus = Arc::new(InMemoryEventBus::new());
    let events = bus.subscribe(EventFilter::all());
    let service = OrderService::new(Arc::new(InMemoryOrderRepository::new()), bus.clone());
    Harness {
        service,
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

fn new_order(email: &str, product_id: ProductId) -> NewOrder {
    NewOrder {
        customer: CustomerInfo {
            email: email.into(),
            name: "Clara Vance".into(),
            phone: None,
        },
        shipping_address: Address {
            line1: "12 Orchard Lane".into(),
            line2: None,
            city: "Portland".into(),
            state: Some("OR".into()),
            postal_code: "97201".into(),
            country: "US".into(),
        },
        lines: vec![OrderLine {
            product_id,
            name: "Sapphire Pendant".into(),
            sku: Some("PD-204".into()),
            unit_price: Money::usd(9_500),
            quantity: 2,
        }],
        subtotal: Money::usd(19_000),
        shipping: Money::usd(0),
        total: Money::usd(19_000),
        note: Some("Gift wrap please".into()),
    }
}

async fn pending(h: &Harness) -> Order {
    h.service
        .create_pending(new_order("clara@example.com", ProductId::new()))
        .await
        .unwrap()
}

// =============================================================================
// Creation and lookup
// =============================================================================

#[tokio::test]
async fn test_create_pending_assigns_number_and_publishes() {
    let mut h = harness();
    let order = pending(&h).await;

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(is_valid_order_number(&order.order_number));
    assert_eq!(order.notes, vec!["Gift wrap please".to_string()]);
    assert_eq!(order.currency.code(), "usd");

    let events = drain(&mut h.events);
    assert!(matches!(
        &events[0],
        StoreEvent::OrderCreated { order_id, .. } if *order_id == order.id
    ));
}

#[tokio::test]
async fn test_create_pending_rejects_invalid_input() {
    let h = harness();
    let mut input = new_order("not-an-email", ProductId::new());
    assert!(matches!(
        h.service.create_pending(input.clone()).await,
        Err(OrderError::Validation(_))
    ));

    input.customer.email = "clara@example.com".into();
    input.lines.clear();
    assert!(matches!(
        h.service.create_pending(input).await,
        Err(OrderError::Validation(_))
    ));
}

#[tokio::test]
async fn test_find_by_number_and_session() {
    let h = harness();
    let order = pending(&h).await;
    h.service
        .attach_checkout_session(order.id, "cs_test_123")
        .await
        .unwrap();

    let by_number = h
        .service
        .find_by_number(&order.order_number.to_lowercase())
        .await
        .unwrap();
    assert_eq!(by_number.id, order.id);

    let by_session = h.service.find_by_checkout_session("cs_test_123").await.unwrap();
    assert_eq!(by_session.map(|o| o.id), Some(order.id));
    assert!(h.service.find_by_checkout_session("cs_other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let h = harness();
    let first = pending(&h).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = h
        .service
        .create_pending(new_order("otto@example.com", ProductId::new()))
        .await
        .unwrap();
    h.service
        .mark_paid(second.id, PaymentDetails::default())
        .await
        .unwrap();

    let all = h.service.list(OrderQuery::default()).await.unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.items[0].id, second.id);

    let paid = h
        .service
        .list(OrderQuery {
            status: Some(OrderStatus::Paid),
            ..OrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(paid.items.len(), 1);

    let by_email = h
        .service
        .list(OrderQuery {
            email: Some("CLARA@example.com".into()),
            ..OrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_email.items[0].id, first.id);
}

#[tokio::test]
async fn test_customer_lookup_requires_matching_email() {
    let h = harness();
    let order = pending(&h).await;

    let found = h
        .service
        .customer_lookup(&order.order_number, "Clara@Example.com")
        .await
        .unwrap();
    assert_eq!(found.id, order.id);

    for (number, email) in [
        (order.order_number.as_str(), "someone@example.com"),
        (order.order_number.as_str(), "garbage"),
        ("AU-20200101-ZZZZZZ", "clara@example.com"),
        ("nonsense", "clara@example.com"),
    ] {
        assert!(matches!(
            h.service.customer_lookup(number, email).await,
            Err(OrderError::NotFound(_))
        ));
    }
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn test_admin_transition_follows_table() {
    let mut h = harness();
    let order = pending(&h).await;
    drain(&mut h.events);

    let err = h
        .service
        .transition(order.id, OrderStatus::Shipped, TransitionContext::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped
        }
    ));

    let paid = h
        .service
        .transition(order.id, OrderStatus::Paid, TransitionContext::default())
        .await
        .unwrap();
    assert!(paid.paid_at.is_some());

    let shipped = h
        .service
        .transition(
            order.id,
            OrderStatus::Shipped,
            TransitionContext {
                tracking_number: Some(" 1Z999AA1 ".into()),
                note: Some("Sent with UPS".into()),
                ..TransitionContext::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shipped.tracking_number.as_deref(), Some("1Z999AA1"));
    assert_eq!(shipped.notes.len(), 2);

    let events = drain(&mut h.events);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[1],
        StoreEvent::OrderStatusChanged {
            from: OrderStatus::Paid,
            to: OrderStatus::Shipped,
            tracking_number: Some(t),
            ..
        } if t == "1Z999AA1"
    ));
}

#[tokio::test]
async fn test_same_state_transition_rejected() {
    let h = harness();
    let order = pending(&h).await;
    assert!(matches!(
        h.service
            .transition(order.id, OrderStatus::Pending, TransitionContext::default())
            .await,
        Err(OrderError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_terminal_states_are_final() {
    let h = harness();
    let order = pending(&h).await;
    h.service
        .transition(order.id, OrderStatus::Cancelled, TransitionContext::default())
        .await
        .unwrap();

    for to in OrderStatus::ALL {
        assert!(h
            .service
            .transition(order.id, to, TransitionContext::default())
            .await
            .is_err());
    }
}

// =============================================================================
// Reconciliation helpers
// =============================================================================

#[tokio::test]
async fn test_mark_paid_is_idempotent() {
    let mut h = harness();
    let order = pending(&h).await;
    drain(&mut h.events);

    let payment = PaymentDetails {
        payment_intent: Some("pi_123".into()),
        customer: Some(CustomerInfo {
            email: "Clara.V@Example.com".into(),
            name: "".into(),
            phone: Some("+1 503 555 0100".into()),
        }),
    };
    let first = h.service.mark_paid(order.id, payment.clone()).await.unwrap();
    let second = h.service.mark_paid(order.id, payment).await.unwrap();

    assert!(first.is_changed());
    assert!(!second.is_changed());
    let paid = first.into_order();
    assert_eq!(paid.payment_intent_id.as_deref(), Some("pi_123"));
    assert_eq!(paid.customer.email, "clara.v@example.com");
    assert_eq!(paid.customer.name, "Clara Vance");
    assert_eq!(drain(&mut h.events).len(), 1);
}

#[tokio::test]
async fn test_late_success_after_failure() {
    let h = harness();
    let order = pending(&h).await;

    assert!(h.service.mark_failed(order.id, "card declined").await.unwrap().is_changed());
    assert!(!h.service.mark_failed(order.id, "card declined").await.unwrap().is_changed());

    let update = h
        .service
        .mark_paid(order.id, PaymentDetails::default())
        .await
        .unwrap();
    assert!(matches!(
        update,
        StatusUpdate::Changed {
            from: OrderStatus::Failed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_mark_paid_on_cancelled_is_invalid() {
    let h = harness();
    let order = pending(&h).await;
    h.service.mark_cancelled(order.id, "checkout expired").await.unwrap();

    assert!(matches!(
        h.service.mark_paid(order.id, PaymentDetails::default()).await,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Paid
        })
    ));
}

#[tokio::test]
async fn test_failure_and_expiry_after_payment_are_ignored() {
    let h = harness();
    let order = pending(&h).await;
    h.service
        .mark_paid(order.id, PaymentDetails::default())
        .await
        .unwrap();

    assert!(!h.service.mark_failed(order.id, "late").await.unwrap().is_changed());
    let update = h.service.mark_cancelled(order.id, "checkout expired").await.unwrap();
    assert_eq!(update.order().status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_partial_refunds_accumulate() {
    let mut h = harness();
    let order = pending(&h).await;
    h.service
        .mark_paid(order.id, PaymentDetails::default())
        .await
        .unwrap();
    drain(&mut h.events);

    let partial = h.service.record_refund(order.id, 5_000).await.unwrap();
    assert!(!partial.is_changed());
    assert_eq!(partial.order().amount_refunded_cents, 5_000);
    assert_eq!(partial.order().status, OrderStatus::Paid);

    let full = h.service.record_refund(order.id, 14_000).await.unwrap();
    assert!(full.is_changed());
    assert_eq!(full.order().status, OrderStatus::Refunded);
    assert_eq!(full.order().refundable_cents(), 0);

    let again = h.service.record_refund(order.id, 100).await.unwrap();
    assert!(!again.is_changed());
    assert_eq!(drain(&mut h.events).len(), 1);
}

#[tokio::test]
async fn test_refund_totals_apply_only_the_increment() {
    let mut h = harness();
    let order = pending(&h).await;
    h.service
        .mark_paid(order.id, PaymentDetails::default())
        .await
        .unwrap();
    drain(&mut h.events);

    let first = h.service.record_refund_total(order.id, 5_000).await.unwrap();
    assert_eq!(first.order().amount_refunded_cents, 5_000);

    // A smaller running total arriving late changes nothing.
    let stale = h.service.record_refund_total(order.id, 3_000).await.unwrap();
    assert!(!stale.is_changed());
    assert_eq!(stale.order().amount_refunded_cents, 5_000);

    let repeat = h.service.record_refund_total(order.id, 5_000).await.unwrap();
    assert_eq!(repeat.order().amount_refunded_cents, 5_000);

    let full = h
        .service
        .record_refund_total(order.id, order.total.amount_cents)
        .await
        .unwrap();
    assert!(full.is_changed());
    assert_eq!(full.order().status, OrderStatus::Refunded);
    assert_eq!(full.order().amount_refunded_cents, order.total.amount_cents);
    assert_eq!(drain(&mut h.events).len(), 1);
}

#[tokio::test]
async fn test_refund_before_payment_rejected() {
    let h = harness();
    let order = pending(&h).await;
    assert!(matches!(
        h.service.record_refund(order.id, 100).await,
        Err(OrderError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_has_purchased_requires_paid_order() {
    let h = harness();
    let product = ProductId::new();
    let order = h
        .service
        .create_pending(new_order("clara@example.com", product))
        .await
        .unwrap();

    assert!(!h.service.has_purchased("clara@example.com", product).await.unwrap());

    h.service
        .mark_paid(order.id, PaymentDetails::default())
        .await
        .unwrap();
    assert!(h.service.has_purchased("CLARA@example.com", product).await.unwrap());
    assert!(!h.service.has_purchased("clara@example.com", ProductId::new()).await.unwrap());
    assert!(!h.service.has_purchased("otto@example.com", product).await.unwrap());

    h.service
        .record_refund(order.id, order.total.amount_cents)
        .await
        .unwrap();
    assert!(!h.service.has_purchased("clara@example.com", product).await.unwrap());
}

#[tokio::test]
async fn test_unknown_order_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.mark_paid(OrderId::new(), PaymentDetails::default()).await,
        Err(OrderError::NotFound(_))
    ));
}
