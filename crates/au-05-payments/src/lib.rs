//! # au-05-payments
//!
//! Checkout against a hosted payment page, and reconciliation of the
//! processor's webhooks back onto orders.
//!
//! ## Checkout
//!
//! 1. Validate customer and shipping address
//! 2. Price the cart from live catalog prices and stock levels
//! 3. Create a `Pending` order
//! 4. Create a hosted checkout session tagged with the order id
//! 5. Attach the session id to the order and return the redirect URL
//!
//! A processor failure at step 4 leaves the order `Failed`.
//!
//! ## Webhooks
//!
//! | Event type                                 | Effect                         |
//! |--------------------------------------------|--------------------------------|
//! | `checkout.session.completed` (paid)        | `Paid`, publishes `OrderPaid`  |
//! | `checkout.session.completed` (unpaid)      | none, payment still in flight  |
//! | `checkout.session.async_payment_succeeded` | `Paid`, publishes `OrderPaid`  |
//! | `checkout.session.async_payment_failed`    | `Failed`                       |
//! | `payment_intent.payment_failed`            | `Failed`                       |
//! | `checkout.session.expired`                 | `Cancelled`                    |
//! | `charge.refunded`                          | refund recorded; `Refunded` when full |
//!
//! Signatures are HMAC-SHA256 over `"{t}.{payload}"`, compared in constant
//! time. Event ids are deduplicated; an id is forgotten again when handling
//! fails so the processor's retry goes through.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{FakePaymentProcessor, StripeCheckoutClient, StripeConfig};
pub use domain::{
    sign_payload, verify_signature, CheckoutRequest, CheckoutResponse, CheckoutSession,
    CheckoutSessionRequest, ReconcileOutcome, Refund, RefundReceipt, SessionLineItem,
    WebhookEvent, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER,
};
pub use error::{PaymentError, PaymentResult, ProcessorError, SignatureError};
pub use ports::{CatalogReader, CheckoutApi, PaymentProcessor, RefundApi, StockReader, WebhookApi};
pub use service::{
    CheckoutConfig, CheckoutService, ReconciliationConfig, ReconciliationService, RefundService,
};
