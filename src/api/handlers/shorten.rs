//! Handler for link shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Responses
///
/// - `201 Created` with the new link
/// - `200 OK` with the caller's existing link for the same destination
///   (`isExisting: true`); no duplicate is created
/// - `400 INVALID_URL` when validation fails, before any side effect
/// - `401` unauthenticated
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Json(payload): Json<ShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .link_service
        .shorten(Some(owner_id), &payload.long_url)
        .await?;

    let status = if outcome.is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    let short_url = state.link_service.short_url(&outcome.link.short_code);

    Ok((status, Json(ShortenResponse::from_outcome(&outcome, short_url))))
}
