//! Subscriber aggregate

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_types::{SubscriberId, ValidationError};
use std::fmt;
use std::str::FromStr;

/// Length of unsubscribe tokens.
pub const TOKEN_LEN: usize = 32;

/// Longest accepted `source` tag.
pub const MAX_SOURCE_LEN: usize = 64;

/// Source recorded when the caller gives none.
pub const DEFAULT_SOURCE: &str = "website";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    /// Imported or legacy rows that never confirmed.
    Pending,
    Active,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Unsubscribed => "unsubscribed",
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriberStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "unsubscribed" => Ok(Self::Unsubscribed),
            other => Err(ValidationError::Invalid(format!(
                "unknown subscriber status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    /// Normalised, unique.
    pub email: String,
    pub status: SubscriberStatus,
    /// Unsubscribe token, rotated on every (re)activation.
    pub token: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// A new subscriber, active immediately.
    pub fn active(email: String, source: String, token: String, now: DateTime<Utc>) -> Self {
        Self {
            id: SubscriberId::new(),
            email,
            status: SubscriberStatus::Active,
            token,
            source,
            created_at: now,
            confirmed_at: Some(now),
            unsubscribed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriberStatus::Active
    }

    pub(crate) fn reactivate(&mut self, token: String, source: String, now: DateTime<Utc>) {
        self.status = SubscriberStatus::Active;
        self.token = token;
        self.source = source;
        self.confirmed_at = Some(now);
        self.unsubscribed_at = None;
    }

    pub(crate) fn unsubscribe(&mut self, now: DateTime<Utc>) {
        self.status = SubscriberStatus::Unsubscribed;
        self.unsubscribed_at = Some(now);
    }
}

/// Result of a subscribe call. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed(Subscriber),
    /// A pending or unsubscribed row was activated again.
    Resubscribed(Subscriber),
    AlreadySubscribed(Subscriber),
}

impl SubscribeOutcome {
    pub fn subscriber(&self) -> &Subscriber {
        match self {
            Self::Subscribed(s) | Self::Resubscribed(s) | Self::AlreadySubscribed(s) => s,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribed(_) => "subscribed",
            Self::Resubscribed(_) => "resubscribed",
            Self::AlreadySubscribed(_) => "already_subscribed",
        }
    }
}

/// Fresh unsubscribe token.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Trim and bound the caller's source tag.
pub fn normalize_source(source: Option<&str>) -> Result<String, ValidationError> {
    let source = source.map(str::trim).filter(|s| !s.is_empty());
    match source {
        None => Ok(DEFAULT_SOURCE.to_string()),
        Some(s) if s.chars().count() > MAX_SOURCE_LEN => Err(ValidationError::TooLong {
            field: "source",
            max: MAX_SOURCE_LEN,
        }),
        Some(s) => Ok(s.to_string()),
    }
}
