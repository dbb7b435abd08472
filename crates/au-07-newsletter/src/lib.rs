//! # au-07-newsletter
//!
//! Newsletter subscribers. Subscription is single opt-in: a new email is
//! `Active` at once and `NewsletterSubscribed` carries its unsubscribe token
//! to the welcome email. Subscribing an active email again is a quiet no-op;
//! an unsubscribed one is reactivated with a new token.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemorySubscriberRepository;
pub use domain::{SubscribeOutcome, Subscriber, SubscriberStatus, DEFAULT_SOURCE};
pub use error::{NewsletterError, NewsletterResult};
pub use ports::{NewsletterApi, SubscriberRepository};
pub use service::NewsletterService;
