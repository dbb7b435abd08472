//! # Subsystem Container
//!
//! Configuration plus the container that builds every subsystem from it.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, StoreConfig};
pub use subsystems::{ContainerError, Repositories, SubsystemContainer};
