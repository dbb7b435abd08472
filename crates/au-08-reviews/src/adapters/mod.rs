//! Adapters for the Reviews subsystem

pub mod memory;

pub use memory::InMemoryReviewRepository;
