//! Destination URL validation.
//!
//! Validation runs before any side effect of link creation. The accepted
//! URL is the trimmed input, stored verbatim: no canonicalization of query
//! order, trailing slashes, or scheme case is performed, so dedupe matches
//! are exact string matches. This is a documented limitation, not a bug.

use url::Url;

/// Errors produced while validating a destination URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Missing,

    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,

    #[error("Please enter a valid URL")]
    Malformed,

    #[error("Cannot shorten URLs from this domain to prevent redirect loops")]
    RedirectLoop,

    #[error("Cannot shorten localhost URLs")]
    LocalhostRejected,
}

/// Validates a destination URL and returns the trimmed form to persist.
///
/// # Rules
///
/// 1. Non-empty after trimming
/// 2. Scheme is `http` or `https`
/// 3. Parses as a URL
/// 4. Does not point back at this service (`base_url` prefix match)
/// 5. When `reject_localhost` is set (production deployments), the host
///    must not be `localhost` or `127.0.0.1`
///
/// # Errors
///
/// Returns the first violated rule as a [`UrlValidationError`].
pub fn validate_long_url(
    input: &str,
    base_url: &str,
    reject_localhost: bool,
) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlValidationError::Missing);
    }

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(UrlValidationError::UnsupportedScheme);
    }

    if !base_url.is_empty() && trimmed.starts_with(base_url) {
        return Err(UrlValidationError::RedirectLoop);
    }

    let parsed = Url::parse(trimmed).map_err(|_| UrlValidationError::Malformed)?;

    if reject_localhost {
        if let Some(host) = parsed.host_str() {
            if host == "localhost" || host == "127.0.0.1" {
                return Err(UrlValidationError::LocalhostRejected);
            }
        }
    }

    Ok(trimmed.to_string())
}
