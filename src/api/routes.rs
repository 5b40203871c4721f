//! API route configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{
    delete_link_handler, get_link_handler, link_analytics_handler, list_links_handler,
    login_handler, logout_handler, me_handler, shorten_handler, signup_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;

/// Owner-scoped API routes. Session authentication is layered on by the
/// top-level router.
///
/// # Endpoints
///
/// - `POST   /shorten`              - Create (or dedupe to) a short link
/// - `GET    /links`                - List the caller's links
/// - `GET    /links/{id}`           - Single link detail
/// - `GET    /links/{id}/analytics` - Monthly click breakdown
/// - `DELETE /links/{id}`           - Delete a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links", get(list_links_handler))
        .route(
            "/links/{id}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route("/links/{id}/analytics", get(link_analytics_handler))
}

/// Account routes. Signup, login, and logout are public; `/me` requires a
/// session.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer));

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(me)
}
