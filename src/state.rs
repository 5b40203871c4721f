//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{AuthService, ClickService, LinkService};
use crate::infrastructure::cache::CacheService;

/// Session cookie settings shared by the auth handlers and middleware.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    /// Set the `Secure` attribute (production deployments behind HTTPS).
    pub secure: bool,
    pub max_age_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    pub cookie: CookieOptions,
}
