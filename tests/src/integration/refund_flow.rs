//! # Refund Flow
//!
//! ```text
//! POST /api/admin/orders/:id/refund ──→ processor
//! webhook: charge.refunded ──→ Orders(4) [refunded] ──OrderRefunded──┬──→ Inventory(2)
//!                                                                    └──→ Notifications(6)
//! ```

#[cfg(test)]
mod tests {
    use crate::harness::{eventually, settle, Store, CUSTOMER};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared_types::OrderStatus;

    #[tokio::test]
    async fn test_full_refund_restocks_and_notifies() {
        let store = Store::start();
        let product = store.seed_product("Opal Signet", 12_000, 4).await;
        let placed = store.checkout(product.id, 2).await;
        store.pay(&placed, placed.total_cents).await;

        let s = &store;
        let id = product.id;
        eventually("sale recorded", move || async move { s.stock(id).await == 2 }).await;

        let (status, body) = store
            .admin(
                Method::POST,
                &format!("/api/admin/orders/{}/refund", placed.order_id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(
            store.processor.refunds(),
            vec![(format!("pi_{}", placed.session_id), None)]
        );
        // The order only changes once the processor confirms.
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Paid);

        let (status, _) = store.charge_refunded(&placed, placed.total_cents).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Refunded);

        eventually("stock returned", move || async move { s.stock(id).await == 4 }).await;
        eventually("refund email", move || async move {
            s.subjects_to(CUSTOMER)
                .iter()
                .any(|subject| subject.starts_with("Refund issued"))
        })
        .await;
        eventually("catalog projection", move || async move {
            s.projected_stock(id).await == 4
        })
        .await;
        store.stop().await;
    }

    #[tokio::test]
    async fn test_partial_refund_keeps_goods_sold() {
        let store = Store::start();
        let product = store.seed_product("Garnet Ear Climbers", 7_000, 3).await;
        let placed = store.checkout(product.id, 1).await;
        store.pay(&placed, placed.total_cents).await;

        let s = &store;
        let id = product.id;
        eventually("sale recorded", move || async move { s.stock(id).await == 2 }).await;

        let (status, body) = store
            .admin(
                Method::POST,
                &format!("/api/admin/orders/{}/refund", placed.order_id),
                Some(json!({ "amount_cents": 1_000 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        store.charge_refunded(&placed, 1_000).await;
        settle().await;

        let order = store.order(placed.order_id).await;
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.amount_refunded_cents, 1_000);
        assert_eq!(store.stock(product.id).await, 2);
        assert!(!store
            .subjects_to(CUSTOMER)
            .iter()
            .any(|subject| subject.starts_with("Refund issued")));

        // The rest of the money later completes the refund.
        store.charge_refunded(&placed, placed.total_cents).await;
        assert_eq!(store.order(placed.order_id).await.status, OrderStatus::Refunded);
        eventually("stock returned", move || async move { s.stock(id).await == 3 }).await;
        store.stop().await;
    }

    #[tokio::test]
    async fn test_refund_above_captured_amount_is_rejected() {
        let store = Store::start();
        let product = store.seed_product("Onyx Cufflinks", 5_000, 1).await;
        let placed = store.checkout(product.id, 1).await;
        store.pay(&placed, placed.total_cents).await;

        let (status, body) = store
            .admin(
                Method::POST,
                &format!("/api/admin/orders/{}/refund", placed.order_id),
                Some(json!({ "amount_cents": placed.total_cents + 1 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(store.processor.refunds().is_empty());
        store.stop().await;
    }
}
