//! Handlers for account and session endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::api::dto::auth::{
    AuthResponse, LoginRequest, LogoutResponse, MeResponse, SignupRequest, UserDto,
};
use crate::api::middleware::{AuthUser, auth::cookie_token};
use crate::error::AppError;
use crate::state::{AppState, CookieOptions};

/// Creates an account and opens a session.
///
/// # Endpoint
///
/// `POST /auth/signup`
///
/// Returns `201` with the profile and token, and sets the session cookie.
/// Duplicate emails yield `409 EMAIL_EXISTS`.
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let (user, token) = state
        .auth_service
        .signup(&payload.email, &payload.password)
        .await?;

    let body = AuthResponse {
        message: "Account created. You can log in now.".to_string(),
        user: UserDto::from(&user),
        token: token.clone(),
    };

    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    set_session_cookie(&mut response, &state.cookie, &token)?;

    Ok(response)
}

/// Verifies credentials and opens a session.
///
/// # Endpoint
///
/// `POST /auth/login`
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let (user, token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    let body = AuthResponse {
        message: "Login successful".to_string(),
        user: UserDto::from(&user),
        token: token.clone(),
    };

    let mut response = Json(body).into_response();
    set_session_cookie(&mut response, &state.cookie, &token)?;

    Ok(response)
}

/// Revokes the presented session (if any) and clears the cookie.
///
/// # Endpoint
///
/// `POST /auth/logout` — deliberately unauthenticated so a client with an
/// already-expired session can still clear its cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_or_cookie_token(&headers, &state.cookie.name) {
        state.auth_service.logout(&token).await?;
    }

    let body = LogoutResponse {
        message: "Logout successful".to_string(),
    };

    let mut response = Json(body).into_response();
    clear_session_cookie(&mut response, &state.cookie)?;

    Ok(response)
}

/// Returns the authenticated caller's profile.
///
/// # Endpoint
///
/// `GET /auth/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.auth_service.current_user(user_id).await?;

    Ok(Json(MeResponse {
        user: UserDto::from(&user),
    }))
}

fn bearer_or_cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| cookie_token(headers, cookie_name))
}

fn set_session_cookie(
    response: &mut Response,
    cookie: &CookieOptions,
    token: &str,
) -> Result<(), AppError> {
    append_cookie(
        response,
        format_cookie(cookie, token, cookie.max_age_seconds),
    )
}

fn clear_session_cookie(response: &mut Response, cookie: &CookieOptions) -> Result<(), AppError> {
    append_cookie(response, format_cookie(cookie, "", 0))
}

fn format_cookie(cookie: &CookieOptions, value: &str, max_age: i64) -> String {
    let mut out = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie.name, value, max_age
    );
    if cookie.secure {
        out.push_str("; Secure");
    }
    out
}

fn append_cookie(response: &mut Response, cookie: String) -> Result<(), AppError> {
    let value = cookie
        .parse()
        .map_err(|_| AppError::internal("Failed to build session cookie"))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}
