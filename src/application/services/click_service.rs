//! Click analytics recording.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Derives the analytics bucket key (`YYYY-MM`) for an instant.
///
/// Buckets are UTC calendar months. Local time would make bucket boundaries
/// depend on where the server happens to run.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Service recording clicks against a link's counters.
///
/// The repository applies both counter updates (`total_clicks` and the
/// month bucket) in one transaction, so the sum invariant holds even if the
/// process dies mid-click, and concurrent clicks are all applied.
pub struct ClickService {
    links: Arc<dyn LinkRepository>,
}

impl ClickService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Records one click for the current UTC month.
    ///
    /// The redirect dispatcher treats this as best-effort: it logs and
    /// swallows the error, so a broken counter never blocks a working
    /// redirect. Outcomes are counted via `metrics` either way.
    pub async fn record_click(&self, code: &str) -> Result<(), AppError> {
        let month = month_key(Utc::now());

        match self.links.increment_clicks(code, &month).await {
            Ok(true) => {
                metrics::counter!("shortlink_clicks_recorded_total").increment(1);
                Ok(())
            }
            Ok(false) => {
                // The link vanished between resolution and recording.
                metrics::counter!("shortlink_clicks_orphaned_total").increment(1);
                Ok(())
            }
            Err(e) => {
                metrics::counter!("shortlink_clicks_failed_total").increment(1);
                Err(e)
            }
        }
    }
}
