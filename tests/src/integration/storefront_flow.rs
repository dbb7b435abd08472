//! # Storefront and Back-Office Flows
//!
//! Fulfilment emails, stock alerts, newsletter sign-up and review
//! moderation, each crossing at least two subsystems.

#[cfg(test)]
mod tests {
    use crate::harness::{eventually, settle, Store, CUSTOMER, STUDIO};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared_types::ProductId;

    #[tokio::test]
    async fn test_fulfilment_emails_follow_status_changes() {
        let store = Store::start();
        let product = store.seed_product("Rose Gold Chain", 15_500, 3).await;
        let placed = store.checkout(product.id, 1).await;
        store.pay(&placed, placed.total_cents).await;

        let (status, body) = store
            .admin(
                Method::POST,
                &format!("/api/admin/orders/{}/status", placed.order_id),
                Some(json!({ "status": "shipped", "tracking_number": "1Z999AA10123456784" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let s = &store;
        eventually("shipping email", move || async move {
            s.subjects_to(CUSTOMER)
                .iter()
                .any(|subject| subject.ends_with("has shipped"))
        })
        .await;
        let shipped = store
            .mail_to(CUSTOMER)
            .into_iter()
            .find(|m| m.subject.ends_with("has shipped"))
            .unwrap();
        assert!(shipped.html.contains("1Z999AA10123456784"));

        let (status, _) = store
            .admin(
                Method::POST,
                &format!("/api/admin/orders/{}/status", placed.order_id),
                Some(json!({ "status": "delivered" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        eventually("delivery email", move || async move {
            s.subjects_to(CUSTOMER)
                .iter()
                .any(|subject| subject.ends_with("was delivered"))
        })
        .await;

        // Customers can look the order up without an account.
        let (status, body) = store
            .get(&format!(
                "/api/orders/lookup?number={}&email=JUNE@example.com",
                placed.order_number
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "delivered");
        store.stop().await;
    }

    #[tokio::test]
    async fn test_sale_below_threshold_alerts_studio() {
        let store = Store::start();
        let (status, product) = store
            .admin(
                Method::POST,
                "/api/admin/products",
                Some(json!({
                    "name": "Moonstone Ring",
                    "price": { "amount_cents": 11_000, "currency": "usd" },
                    "low_stock_threshold": 2
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{product}");
        let product_id: ProductId = serde_json::from_value(product["id"].clone()).unwrap();

        let (status, _) = store
            .admin(
                Method::POST,
                "/api/admin/stock/movements",
                Some(json!({
                    "product_id": product_id,
                    "kind": "in",
                    "quantity": 3,
                    "reason": "restock"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        settle().await;
        assert!(store.mail_to(STUDIO).is_empty());

        let placed = store.checkout(product_id, 1).await;
        store.pay(&placed, placed.total_cents).await;

        let s = &store;
        eventually("low stock alert", move || async move {
            s.subjects_to(STUDIO)
                .iter()
                .any(|subject| subject == "Low stock: Moonstone Ring (2 left)")
        })
        .await;

        let slug = product["slug"].as_str().unwrap();
        let (status, body) = store.get(&format!("/api/products/{slug}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"], 2);
        store.stop().await;
    }

    #[tokio::test]
    async fn test_newsletter_welcome_is_sent_once() {
        let store = Store::start();
        let (status, body) = store
            .post(
                "/api/newsletter/subscribe",
                json!({ "email": " Iris@Example.com ", "source": "footer" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["email"], "iris@example.com");

        let s = &store;
        eventually("welcome email", move || async move {
            !s.mail_to("iris@example.com").is_empty()
        })
        .await;

        let (status, body) = store
            .post("/api/newsletter/subscribe", json!({ "email": "iris@example.com" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "already_subscribed");
        settle().await;

        let welcomes = store.mail_to("iris@example.com");
        assert_eq!(welcomes.len(), 1);
        assert_eq!(welcomes[0].subject, "Welcome to Aurelia");
        store.stop().await;
    }

    #[tokio::test]
    async fn test_buyer_review_is_verified_and_published_after_approval() {
        let store = Store::start();
        let product = store.seed_product("Aquamarine Studs", 8_800, 2).await;
        let placed = store.checkout(product.id, 1).await;
        store.pay(&placed, placed.total_cents).await;

        let (status, body) = store
            .post(
                &format!("/api/products/{}/reviews", product.id),
                json!({
                    "author_name": "June",
                    "author_email": CUSTOMER,
                    "rating": 4,
                    "title": "Delicate",
                    "body": "Exactly as pictured."
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["review"]["verified_purchase"], true);
        let review_id = body["review"]["id"].as_str().unwrap().to_string();

        let (_, pending) = store.admin(Method::GET, "/api/admin/reviews/pending", None).await;
        assert_eq!(pending["total"], 1);

        let (status, _) = store
            .admin(
                Method::POST,
                &format!("/api/admin/reviews/{review_id}/approve"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, listing) = store
            .get(&format!("/api/products/{}/reviews", product.id))
            .await;
        assert_eq!(listing["summary"]["count"], 1);
        assert_eq!(listing["reviews"]["items"][0]["rating"], 4);

        // A second review from the same address is refused.
        let (status, _) = store
            .post(
                &format!("/api/products/{}/reviews", product.id),
                json!({
                    "author_name": "June",
                    "author_email": CUSTOMER,
                    "rating": 5,
                    "body": "Bought another pair."
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        store.stop().await;
    }
}
