//! Handler for short URL redirect.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use tracing::{error, warn};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::is_valid_code;

/// Resolves a short code and redirects to its destination.
///
/// # Endpoint
///
/// `GET /{code}` — the only fully public entry point into link data.
///
/// # Request Flow
///
/// 1. Format check: anything but 7 alphanumeric characters is rejected
///    with `404 INVALID_SHORT_CODE` before any cache or store access
/// 2. Cache lookup; on a miss (or cache error) fall back to the store and
///    populate the cache fire-and-forget
/// 3. Record the click; a failure here is logged and swallowed so a broken
///    counter never costs a redirect
/// 4. Respond `302 Found` with the destination in `Location`
///
/// # Errors
///
/// Returns `404 LINK_NOT_FOUND` for well-formed codes that map to nothing.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if !is_valid_code(&code) {
        return Err(AppError::InvalidShortCode);
    }

    let cached = match state.cache.get_url(&code).await {
        Ok(hit) => hit,
        Err(e) => {
            error!("Cache error: {}", e);
            None
        }
    };

    let long_url = match cached {
        Some(url) => {
            metrics::counter!("shortlink_redirect_cache_hits_total").increment(1);
            url
        }
        None => {
            metrics::counter!("shortlink_redirect_cache_misses_total").increment(1);

            let link = state.link_service.resolve(&code).await?;

            // Populate the cache without holding up the redirect.
            let cache = state.cache.clone();
            let cache_code = code.clone();
            let cache_url = link.long_url.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_url(&cache_code, &cache_url, None).await {
                    error!("Failed to cache URL: {}", e);
                }
            });

            link.long_url
        }
    };

    // Best-effort: the redirect goes out whether or not the counters moved.
    if let Err(e) = state.click_service.record_click(&code).await {
        warn!(code = %code, error = %e, "failed to record click");
    }

    found_redirect(&long_url)
}

/// Builds a `302 Found` response. Clients expect 302 here, not the 303/307
/// that axum's `Redirect` helpers produce.
fn found_redirect(long_url: &str) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, long_url)
        .body(Body::empty())
        .map_err(|e| AppError::internal(format!("Failed to build redirect: {}", e)))
}
