//! Adapters for the Payments subsystem

pub mod fake;
pub mod stripe;

pub use fake::FakePaymentProcessor;
pub use stripe::{StripeCheckoutClient, StripeConfig};
