//! Ports module for the Notifications subsystem

pub mod outbound;

pub use outbound::{Mailer, ProductDirectory};
