//! # au-03-cart
//!
//! Cart lines and the server-side price quote used by checkout.
//!
//! A cart holds only product ids and quantities. `price_cart` turns it into
//! a [`Quote`] using catalog snapshots and stock levels read on the server,
//! so a client can never influence what it is charged.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;

pub use domain::{
    price_cart, Cart, CartLine, Quote, ShippingPolicy, DEFAULT_MAX_QUANTITY_PER_LINE,
};
pub use error::{CartError, CartResult};
