//! Domain module for the Cart subsystem

pub mod cart;
pub mod pricing;

pub use cart::{Cart, CartLine, DEFAULT_MAX_QUANTITY_PER_LINE};
pub use pricing::{price_cart, Quote, ShippingPolicy};
