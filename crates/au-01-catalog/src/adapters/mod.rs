//! Adapters for the Catalog subsystem

pub mod memory;

pub use memory::InMemoryCatalogRepository;
