//! Adapters for the Notifications subsystem

pub mod http;
pub mod outbox;

pub use http::{HttpMailer, HttpMailerConfig};
pub use outbox::OutboxMailer;
