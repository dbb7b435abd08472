//! Catalog domain

pub mod entities;
pub mod query;

pub use entities::*;
pub use query::{ProductFilter, ProductQuery, ProductSort};
