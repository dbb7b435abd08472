//! Rating aggregates

use super::review::{MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};

/// Approved-review statistics for one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: u32,
    /// Mean rating rounded to one decimal; 0.0 without reviews.
    pub average: f64,
    /// `distribution[i]` counts ratings of `i + 1` stars.
    pub distribution: [u32; 5],
}

impl RatingSummary {
    /// Ratings outside `1..=5` are skipped.
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let mut distribution = [0u32; 5];
        let mut count = 0u32;
        let mut sum = 0u64;
        for rating in ratings {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                continue;
            }
            distribution[usize::from(rating - 1)] += 1;
            count += 1;
            sum += u64::from(rating);
        }
        let average = if count == 0 {
            0.0
        } else {
            (sum as f64 / f64::from(count) * 10.0).round() / 10.0
        };
        Self {
            count,
            average,
            distribution,
        }
    }
}
