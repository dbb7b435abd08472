//! Ports module for the Newsletter subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::NewsletterApi;
pub use outbound::SubscriberRepository;
