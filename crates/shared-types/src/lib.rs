//! # Shared Types Crate
//!
//! This crate contains the identifiers, money type and order snapshots that
//! flow between the Aurelia subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a subsystem boundary
//!   (through the event bus or a port) is defined here.
//! - **Snapshots, not references**: Events carry an [`OrderSummary`] with the
//!   prices captured at checkout, so consumers never re-read the catalog to
//!   learn what was sold.
//! - **Integer money**: Amounts are minor units (cents) in an `i64`, matching
//!   the payment processor's wire format.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entities;
pub mod errors;
pub mod ids;
pub mod money;
pub mod pagination;
pub mod validation;

pub use entities::*;
pub use errors::*;
pub use ids::*;
pub use money::{Currency, Money};
pub use pagination::{Page, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use validation::{normalize_email, slugify, MAX_EMAIL_LEN};
