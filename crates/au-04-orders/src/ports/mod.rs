//! Ports module for the Orders subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::OrderApi;
pub use outbound::OrderRepository;
