//! # au-06-notifications
//!
//! Transactional email. [`NotificationHandler`] subscribes to the bus and
//! renders one or more emails per event:
//!
//! | Event                                  | Recipients        |
//! |----------------------------------------|-------------------|
//! | `OrderPaid`                            | customer, admins  |
//! | `OrderPaymentFailed`                   | customer          |
//! | `OrderStatusChanged` to shipped/delivered | customer       |
//! | `OrderRefunded`                        | customer          |
//! | `LowStock`, `PaymentAmountMismatch`    | admins            |
//! | `NewsletterSubscribed`                 | subscriber        |
//!
//! Delivery goes through the [`Mailer`] port: [`HttpMailer`] in production,
//! [`OutboxMailer`] in development and tests.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{HttpMailer, HttpMailerConfig, OutboxMailer};
pub use domain::{escape_html, templates, EmailMessage, StoreBranding};
pub use error::{NotificationError, NotificationResult};
pub use ports::{Mailer, ProductDirectory};
pub use service::{NotificationConfig, NotificationHandler, NotificationStats};
