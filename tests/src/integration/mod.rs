//! Cross-subsystem flows.

mod checkout_flow;
mod refund_flow;
mod storefront_flow;
