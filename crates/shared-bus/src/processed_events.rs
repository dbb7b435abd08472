//! # Processed Event Cache
//!
//! Time-bounded de-duplication of payment processor webhook events.
//!
//! The processor delivers events at least once and retries for up to three
//! days, so the same event id can arrive many times. The cache remembers every
//! id it has accepted within the retention window.
//!
//! - Events created before `now - retention` are rejected as `Expired`.
//! - Ids are garbage-collected after the retention window, which bounds
//!   memory use.
//! - A handler that fails after `check_and_insert` calls `release` so the
//!   processor's retry is processed again.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from the processed-event cache.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessedEventError {
    /// The event id was already accepted.
    #[error("Event {event_id} has already been processed")]
    Duplicate { event_id: String },

    /// The event is older than the retention window.
    #[error("Event created at {created_at} is older than the retention threshold {threshold}")]
    Expired { created_at: i64, threshold: i64 },
}

/// Time-bounded set of processed event ids.
pub struct ProcessedEventCache {
    /// Map of event id -> event creation timestamp.
    cache: HashMap<String, i64>,

    /// Retention window in seconds.
    retention_secs: i64,

    /// Last garbage collection timestamp.
    last_gc: i64,

    /// Garbage collection interval in seconds.
    gc_interval_secs: i64,
}

impl ProcessedEventCache {
    /// Default retention: the processor's three-day retry horizon.
    pub const DEFAULT_RETENTION: i64 = 3 * 24 * 60 * 60;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: i64 = 10 * 60;

    /// Create a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_RETENTION, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a cache with custom settings.
    #[must_use]
    pub fn with_config(retention_secs: i64, gc_interval_secs: i64) -> Self {
        Self {
            cache: HashMap::new(),
            retention_secs,
            last_gc: Self::current_timestamp(),
            gc_interval_secs,
        }
    }

    /// Check an event against the cache and remember it.
    ///
    /// # Errors
    ///
    /// - `ProcessedEventError::Expired` - created before the retention window
    /// - `ProcessedEventError::Duplicate` - id already accepted
    pub fn check_and_insert(
        &mut self,
        event_id: &str,
        created_at: i64,
    ) -> Result<(), ProcessedEventError> {
        self.check_and_insert_at(event_id, created_at, Self::current_timestamp())
    }

    /// Same as [`check_and_insert`](Self::check_and_insert) with an explicit clock.
    pub fn check_and_insert_at(
        &mut self,
        event_id: &str,
        created_at: i64,
        now: i64,
    ) -> Result<(), ProcessedEventError> {
        // Age check first: it bounds everything the cache has to remember.
        let threshold = now.saturating_sub(self.retention_secs);
        if created_at < threshold {
            return Err(ProcessedEventError::Expired {
                created_at,
                threshold,
            });
        }

        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if self.cache.contains_key(event_id) {
            return Err(ProcessedEventError::Duplicate {
                event_id: event_id.to_string(),
            });
        }

        self.cache.insert(event_id.to_string(), created_at);
        Ok(())
    }

    /// Forget an event id so a retry is processed again.
    pub fn release(&mut self, event_id: &str) -> bool {
        self.cache.remove(event_id).is_some()
    }

    /// Check if an id is present without adding it.
    #[must_use]
    pub fn contains(&self, event_id: &str) -> bool {
        self.cache.contains_key(event_id)
    }

    /// Get the number of cached ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Remove ids older than the retention window.
    pub fn garbage_collect(&mut self, now: i64) {
        let threshold = now.saturating_sub(self.retention_secs);
        self.cache.retain(|_, &mut created| created >= threshold);
    }

    fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl Default for ProcessedEventCache {
    fn default() -> Self {
        Self::new()
    }
}
