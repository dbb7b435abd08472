//! Adapters for the Newsletter subsystem

pub mod memory;

pub use memory::InMemorySubscriberRepository;
