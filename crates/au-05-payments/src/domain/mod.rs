//! Domain module for the Payments subsystem

pub mod checkout;
pub mod outcome;
pub mod signature;
pub mod webhook;

pub use checkout::{
    success_url_with_session, CheckoutRequest, CheckoutResponse, CheckoutSession,
    CheckoutSessionRequest, Refund, RefundReceipt, SessionLineItem, SESSION_ID_PLACEHOLDER,
};
pub use outcome::ReconcileOutcome;
pub use signature::{sign_payload, verify_signature, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
pub use webhook::{
    ChargeObject, CustomerDetails, EventData, OrderLookup, PaymentIntentObject, SessionObject,
    WebhookAction, WebhookEvent, ORDER_ID_METADATA_KEY,
};
