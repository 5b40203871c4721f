//! Link entity representing a shortened URL mapping with click counters.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A shortened URL with its click analytics.
///
/// `short_code`, `long_url`, and `owner_id` are immutable after creation;
/// only the counters change, and only through the click recorder. The
/// monthly map is ordered by month key so analytics come out sorted and the
/// sum invariant (`total_clicks == sum of monthly values`) stays easy to
/// check.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    /// `None` for anonymous links.
    pub owner_id: Option<i64>,
    pub short_code: String,
    pub long_url: String,
    pub total_clicks: i64,
    /// Month key (`YYYY-MM`) to click count; entries appear lazily on the
    /// first click of a month.
    pub clicks_by_month: BTreeMap<String, i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Sum of all monthly buckets; equals `total_clicks` when the store's
    /// transactional increment has done its job.
    pub fn monthly_total(&self) -> i64 {
        self.clicks_by_month.values().sum()
    }

    /// Monthly buckets between two optional month keys, inclusive.
    ///
    /// Bounds compare as plain strings, which is correct for zero-padded
    /// `YYYY-MM` keys. Results are ascending by month.
    pub fn monthly_between(&self, from: Option<&str>, to: Option<&str>) -> Vec<(String, i64)> {
        self.clicks_by_month
            .iter()
            .filter(|(month, _)| {
                if let Some(from) = from {
                    if month.as_str() < from {
                        return false;
                    }
                }
                if let Some(to) = to {
                    if month.as_str() > to {
                        return false;
                    }
                }
                true
            })
            .map(|(month, clicks)| (month.clone(), *clicks))
            .collect()
    }
}

/// Input data for creating a new link.
///
/// Counters are not part of the input: every link starts at zero.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub owner_id: Option<i64>,
    pub short_code: String,
    pub long_url: String,
}
