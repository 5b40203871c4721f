//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::ShortenOutcome;

/// Request to shorten a URL. Validation happens in the service so it runs
/// before any side effect.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub long_url: String,
}

/// Response for both fresh creations (201) and dedupe hits (200).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
    pub long_url: String,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub link_id: i64,
    /// `true` when an existing link for the same owner and destination was
    /// reused instead of creating a duplicate.
    pub is_existing: bool,
}

impl ShortenResponse {
    pub fn from_outcome(outcome: &ShortenOutcome, short_url: String) -> Self {
        Self {
            short_url,
            short_code: outcome.link.short_code.clone(),
            long_url: outcome.link.long_url.clone(),
            total_clicks: outcome.link.total_clicks,
            created_at: outcome.link.created_at,
            link_id: outcome.link.id,
            is_existing: outcome.is_existing,
        }
    }
}
