//! Ports module for the Catalog subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::{CatalogApi, Visibility};
pub use outbound::CatalogRepository;
