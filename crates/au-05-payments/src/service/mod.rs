//! Payment services
//!
//! - [`CheckoutService`]: quote and start checkout
//! - [`ReconciliationService`]: verify and apply processor webhooks
//! - [`RefundService`]: admin-initiated refunds

mod checkout;
mod reconciliation;
mod refund;

pub use checkout::{CheckoutConfig, CheckoutService};
pub use reconciliation::{ReconciliationConfig, ReconciliationService};
pub use refund::RefundService;
