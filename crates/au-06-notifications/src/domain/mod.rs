//! Domain module for the Notifications subsystem

pub mod message;
pub mod templates;

pub use message::{escape_html, EmailMessage};
pub use templates::StoreBranding;
