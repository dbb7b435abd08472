//! Adapters for the Orders subsystem

pub mod memory;

pub use memory::InMemoryOrderRepository;
