//! Session authentication middleware.
//!
//! Accepts either `Authorization: Bearer <token>` (API clients) or the
//! session cookie (browser clients), in that order. On success the
//! authenticated user id is injected into request extensions as
//! [`AuthUser`] for handlers to extract.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// Authenticates a request and forwards it with [`AuthUser`] attached.
///
/// # Errors
///
/// Returns `401 Unauthorized` when no token is presented or the session is
/// unknown, revoked, or expired.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = match AuthBearer::from_request_parts(&mut parts, &()).await {
        Ok(AuthBearer(token)) => Some(token),
        Err(_) => cookie_token(&parts.headers, &st.cookie.name),
    };

    let token =
        token.ok_or_else(|| AppError::unauthorized("Session expired. Please log in."))?;

    let user_id = st.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}

/// Extracts the session token from the `Cookie` header, if present.
///
/// Splits on semicolons and picks the configured cookie name, ignoring any
/// other cookies.
pub fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|cookie_header| cookie_header.to_str().ok())
        .and_then(|cookie_str| {
            cookie_str.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(name), Some(value)) if name == cookie_name => Some(value.to_string()),
                    _ => None,
                }
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_cookie_token_single_cookie() {
        let headers = headers_with_cookie("sid=abc123");
        assert_eq!(cookie_token(&headers, "sid"), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_token_among_many() {
        let headers = headers_with_cookie("theme=dark; sid=tok-42; lang=en");
        assert_eq!(cookie_token(&headers, "sid"), Some("tok-42".to_string()));
    }

    #[test]
    fn test_cookie_token_wrong_name() {
        let headers = headers_with_cookie("other=abc123");
        assert_eq!(cookie_token(&headers, "sid"), None);
    }

    #[test]
    fn test_cookie_token_no_header() {
        assert_eq!(cookie_token(&HeaderMap::new(), "sid"), None);
    }
}
