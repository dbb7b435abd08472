//! # au-01-catalog
//!
//! Products, categories and collections for the Aurelia storefront.
//!
//! ## Overview
//!
//! - **Browsing**: filtered, sorted, paginated product listings; public
//!   callers only ever see active products
//! - **Admin CRUD**: products, categories (a tree), collections (curated
//!   groups, many-to-many with products)
//! - **Stock projection**: `Product::stock` mirrors the inventory ledger and
//!   is written only through `set_product_stock`
//!
//! ## Architecture
//!
//! ```text
//! API Gateway (9) ──CatalogApi──→ CatalogService ──CatalogRepository──→ memory | BaaS
//!                                      ↑
//! Inventory (2) ──StockChanged──→ runtime projection handler
//! ```
//!
//! ## Slugs
//!
//! Product slugs derived from the name are made unique with `-2`, `-3`, ...
//! suffixes. Explicit slugs, and all category and collection slugs, must be
//! unique as given.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryCatalogRepository;
pub use domain::{
    Category, CategoryPatch, Collection, CollectionPatch, NewCategory, NewCollection, NewProduct,
    Product, ProductFilter, ProductPatch, ProductQuery, ProductSort,
};
pub use error::{CatalogError, CatalogResult};
pub use ports::{CatalogApi, CatalogRepository, Visibility};
pub use service::CatalogService;
