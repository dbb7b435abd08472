//! # Checkout Flow
//!
//! ```text
//! POST /api/checkout ──→ Payments(5) ──→ Orders(4) [pending]
//!                                            │
//! webhook: checkout.session.completed ──→ Orders(4) [paid] ──OrderPaid──┐
//!                                                                       │
//!            ┌──────────────────────────────────────────────────────────┤
//!            ↓                                                          ↓
//!      Inventory(2) ──StockChanged──→ Catalog(1)                Notifications(6)
//! ```

#[cfg(test)]
mod tests {
    use crate::harness::{eventually, settle, Store, CUSTOMER, STUDIO};
    use axum::http::StatusCode;
    use serde_json::json;
    use shared_types::OrderStatus;

    #[tokio::test]
    async fn test_paid_order_moves_stock_and_sends_confirmations() {
        let store = Store::start();
        let product = store.seed_product("Gold Huggie Hoops", 4_500, 5).await;
        let placed = store.checkout(product.id, 2).await;
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Pending);
        // Nothing leaves the shelf before payment.
        assert_eq!(store.stock(product.id).await, 5);

        let (status, body) = store.pay(&placed, placed.total_cents).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["outcome"], "reconciled");

        let s = &store;
        let id = product.id;
        eventually("sale recorded", move || async move { s.stock(id).await == 3 }).await;
        eventually("catalog projection", move || async move {
            s.projected_stock(id).await == 3
        })
        .await;
        eventually("customer confirmation", move || async move {
            !s.mail_to(CUSTOMER).is_empty()
        })
        .await;
        eventually("studio notice", move || async move { !s.mail_to(STUDIO).is_empty() }).await;

        let confirmation = &store.mail_to(CUSTOMER)[0];
        assert!(confirmation.subject.contains(&placed.order_number));
        assert!(confirmation.html.contains("Gold Huggie Hoops"));
        assert!(store.subjects_to(STUDIO)[0].starts_with("New order"));

        let order = store.order(placed.order_id).await;
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.paid_at.is_some());
        store.stop().await;
    }

    #[tokio::test]
    async fn test_redelivered_webhook_changes_nothing() {
        let store = Store::start();
        let product = store.seed_product("Pearl Studs", 6_000, 4).await;
        let placed = store.checkout(product.id, 1).await;

        store.pay(&placed, placed.total_cents).await;
        let s = &store;
        let id = product.id;
        eventually("sale recorded", move || async move { s.stock(id).await == 3 }).await;

        let (status, body) = store.pay(&placed, placed.total_cents).await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["outcome"], "reconciled");
        settle().await;

        assert_eq!(store.stock(product.id).await, 3);
        assert_eq!(store.mail_to(CUSTOMER).len(), 1);
        let movements = store.inventory.movements(product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 2);
        store.stop().await;
    }

    #[tokio::test]
    async fn test_oversold_stock_goes_negative_after_payment() {
        let store = Store::start();
        let product = store.seed_product("Last Diamond Solitaire", 250_000, 1).await;

        // Both checkouts see one ring available; both customers pay.
        let first = store.checkout(product.id, 1).await;
        let second = store.checkout(product.id, 1).await;
        store.pay(&first, first.total_cents).await;
        store.pay(&second, second.total_cents).await;

        let s = &store;
        let id = product.id;
        eventually("both sales recorded", move || async move { s.stock(id).await == -1 }).await;
        assert_eq!(store.order(second.order_id).await.status, OrderStatus::Paid);
        store.stop().await;
    }

    #[tokio::test]
    async fn test_checkout_refuses_more_than_available() {
        let store = Store::start();
        let product = store.seed_product("Ruby Cocktail Ring", 80_000, 1).await;
        let (status, body) = store
            .post(
                "/api/checkout",
                json!({
                    "customer": { "email": "june@example.com", "name": "June Park" },
                    "shipping_address": {
                        "line1": "88 Harbor St",
                        "city": "Seattle",
                        "postal_code": "98101",
                        "country": "US"
                    },
                    "lines": [{ "product_id": product.id, "quantity": 2 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        assert!(store.processor.sessions().is_empty());
        store.stop().await;
    }

    #[tokio::test]
    async fn test_short_capture_alerts_studio_but_order_stays_paid() {
        let store = Store::start();
        let product = store.seed_product("Sapphire Bangle", 9_000, 2).await;
        let placed = store.checkout(product.id, 1).await;

        let (status, _) = store.pay(&placed, placed.total_cents - 1_000).await;
        assert_eq!(status, StatusCode::OK);

        let s = &store;
        eventually("mismatch alert", move || async move {
            s.subjects_to(STUDIO)
                .iter()
                .any(|subject| subject.starts_with("Payment amount mismatch"))
        })
        .await;
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Paid);
        store.stop().await;
    }

    #[tokio::test]
    async fn test_failed_async_payment_emails_customer() {
        let store = Store::start();
        let product = store.seed_product("Emerald Drop Necklace", 32_000, 2).await;
        let placed = store.checkout(product.id, 1).await;

        let (status, body) = store
            .webhook(json!({
                "id": "evt_async_failed",
                "type": "checkout.session.async_payment_failed",
                "created": chrono::Utc::now().timestamp(),
                "data": { "object": {
                    "id": placed.session_id,
                    "metadata": { "order_id": placed.order_id.to_string() },
                    "payment_status": "unpaid",
                }},
            }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let s = &store;
        eventually("failure email", move || async move { !s.mail_to(CUSTOMER).is_empty() }).await;
        assert!(store.subjects_to(CUSTOMER)[0].contains("did not go through"));
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Failed);
        settle().await;
        assert_eq!(store.stock(product.id).await, 2);
        store.stop().await;
    }
}
