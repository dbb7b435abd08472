//! # BaaS Adapters
//!
//! Repository ports implemented over the hosted database's PostgREST API.
//! Rows are the serde form of the domain types: nested values (money,
//! addresses, order lines) live in JSON columns.
//!
//! | Port | Table(s) |
//! |------|----------|
//! | `CatalogRepository` | `products`, `categories`, `collections` |
//! | `LedgerRepository` | `stock_movements`, `stock_levels` |
//! | `OrderRepository` | `orders` |
//! | `SubscriberRepository` | `newsletter_subscribers` |
//! | `ReviewRepository` | `product_reviews` |

pub mod catalog;
pub mod client;
pub mod inventory;
pub mod newsletter;
pub mod orders;
pub mod reviews;

pub use catalog::BaasCatalogRepository;
pub use client::{BaasClient, BaasClientConfig, BaasError, BaasResult, Query};
pub use inventory::BaasLedgerRepository;
pub use newsletter::BaasSubscriberRepository;
pub use orders::BaasOrderRepository;
pub use reviews::BaasReviewRepository;

#[cfg(test)]
mod tests;
