//! Checkout orchestration

use crate::domain::{
    success_url_with_session, CheckoutRequest, CheckoutResponse, CheckoutSessionRequest,
    SessionLineItem, ORDER_ID_METADATA_KEY,
};
use crate::error::{PaymentError, PaymentResult};
use crate::ports::inbound::CheckoutApi;
use crate::ports::outbound::{CatalogReader, PaymentProcessor, StockReader};
use async_trait::async_trait;
use au_03_cart::{price_cart, Cart, Quote, ShippingPolicy, DEFAULT_MAX_QUANTITY_PER_LINE};
use au_04_orders::{NewOrder, Order, OrderApi};
use shared_types::{normalize_email, ProductId, ProductSnapshot, ValidationError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Checkout configuration
#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    /// Where the processor sends the customer after paying.
    pub success_url: String,
    /// Where the processor sends the customer after abandoning.
    pub cancel_url: String,
    pub shipping: ShippingPolicy,
    pub max_quantity_per_line: u32,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/cart".to_string(),
            shipping: ShippingPolicy::default(),
            max_quantity_per_line: DEFAULT_MAX_QUANTITY_PER_LINE,
        }
    }
}

/// Checkout Service implementation
pub struct CheckoutService {
    config: CheckoutConfig,
    catalog: Arc<dyn CatalogReader>,
    stock: Arc<dyn StockReader>,
    orders: Arc<dyn OrderApi>,
    processor: Arc<dyn PaymentProcessor>,
}

impl CheckoutService {
    pub fn new(
        config: CheckoutConfig,
        catalog: Arc<dyn CatalogReader>,
        stock: Arc<dyn StockReader>,
        orders: Arc<dyn OrderApi>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            config,
            catalog,
            stock,
            orders,
            processor,
        }
    }

    /// Price `cart` and hand back the snapshots it was priced from.
    async fn price(&self, cart: Cart) -> PaymentResult<(Quote, Vec<ProductSnapshot>)> {
        let cart = cart.with_max_quantity_per_line(self.config.max_quantity_per_line);
        let ids: Vec<ProductId> = cart.merged_lines().iter().map(|l| l.product_id).collect();
        let products = self.catalog.products_by_ids(&ids).await?;
        let levels = self.stock.levels(&ids).await?;
        let quote = price_cart(&cart, &products, &levels, &self.config.shipping)?;
        Ok((quote, products))
    }

    fn validate(request: &mut CheckoutRequest) -> Result<(), ValidationError> {
        request.customer.email = normalize_email(&request.customer.email)?;
        request.customer.name = request.customer.name.trim().to_string();
        if request.customer.name.is_empty() {
            return Err(ValidationError::Required("customer.name"));
        }
        request.shipping_address.validate()
    }

    fn session_request(
        &self,
        order: &Order,
        images: &HashMap<ProductId, String>,
    ) -> CheckoutSessionRequest {
        let currency = order.currency.code().to_string();
        let mut line_items: Vec<SessionLineItem> = order
            .lines
            .iter()
            .map(|line| SessionLineItem {
                name: line.name.clone(),
                currency: currency.clone(),
                unit_amount_cents: line.unit_price.amount_cents,
                quantity: line.quantity,
                image: images.get(&line.product_id).cloned(),
            })
            .collect();
        if order.shipping.amount_cents > 0 {
            line_items.push(SessionLineItem {
                name: "Shipping".to_string(),
                currency,
                unit_amount_cents: order.shipping.amount_cents,
                quantity: 1,
                image: None,
            });
        }

        let mut metadata = BTreeMap::new();
        metadata.insert(ORDER_ID_METADATA_KEY.to_string(), order.id.to_string());
        metadata.insert("order_number".to_string(), order.order_number.clone());

        CheckoutSessionRequest {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_email: order.customer.email.clone(),
            line_items,
            success_url: success_url_with_session(&self.config.success_url),
            cancel_url: self.config.cancel_url.clone(),
            metadata,
        }
    }
}

#[async_trait]
impl CheckoutApi for CheckoutService {
    async fn quote(&self, cart: Cart) -> PaymentResult<Quote> {
        Ok(self.price(cart).await?.0)
    }

    async fn start_checkout(&self, mut request: CheckoutRequest) -> PaymentResult<CheckoutResponse> {
        Self::validate(&mut request)?;

        let cart = Cart::from_lines(request.lines);
        let (quote, products) = self.price(cart).await?;
        let images: HashMap<ProductId, String> = products
            .into_iter()
            .filter_map(|p| p.image.map(|img| (p.id, img)))
            .collect();

        let order = self
            .orders
            .create_pending(NewOrder {
                customer: request.customer,
                shipping_address: request.shipping_address,
                lines: quote.lines,
                subtotal: quote.subtotal,
                shipping: quote.shipping,
                total: quote.total,
                note: request.note,
            })
            .await?;

        let session = match self
            .processor
            .create_checkout_session(self.session_request(&order, &images))
            .await
        {
            Ok(session) => session,
            Err(e) => {
                error!(
                    order_number = %order.order_number,
                    error = %e,
                    "[au-05] Checkout session creation failed"
                );
                if let Err(mark_err) = self
                    .orders
                    .mark_failed(order.id, "checkout session could not be created")
                    .await
                {
                    warn!(
                        order_number = %order.order_number,
                        error = %mark_err,
                        "[au-05] Could not mark order failed"
                    );
                }
                return Err(PaymentError::from(e));
            }
        };

        self.orders
            .attach_checkout_session(order.id, &session.id)
            .await?;

        info!(
            order_number = %order.order_number,
            session_id = %session.id,
            total = %order.total,
            "[au-05] Checkout started"
        );
        Ok(CheckoutResponse {
            order_id: order.id,
            order_number: order.order_number,
            checkout_url: session.url,
        })
    }
}
