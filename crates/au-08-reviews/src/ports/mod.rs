//! Ports module for the Reviews subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::ReviewApi;
pub use outbound::ReviewRepository;
