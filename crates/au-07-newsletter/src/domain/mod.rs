//! Domain module for the Newsletter subsystem

pub mod subscriber;

pub use subscriber::{
    generate_token, normalize_source, SubscribeOutcome, Subscriber, SubscriberStatus,
    DEFAULT_SOURCE, MAX_SOURCE_LEN, TOKEN_LEN,
};
