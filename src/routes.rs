//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`  - Store/cache health (public)
//! - `GET  /{code}`  - Short link redirect (public)
//! - `/auth/*`       - Accounts and sessions
//! - `/api/*`        - Owner-scoped dashboard API (session required)
//!
//! # Middleware
//!
//! - **Tracing** - request/response logging across every route
//! - **Rate limiting** - per-IP token buckets; stricter on credential
//!   endpoints
//! - **Authentication** - Bearer token or session cookie on `/api` and
//!   `/auth/me`
//! - **Path normalization** - trailing slash handling

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer());

    let auth_router = api::routes::auth_routes(state.clone()).layer(rate_limit::secure_layer());

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/auth", auth_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
