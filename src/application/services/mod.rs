//! Business logic services.

pub mod auth_service;
pub mod click_service;
pub mod link_service;

pub use auth_service::AuthService;
pub use click_service::ClickService;
pub use link_service::{LinkService, ShortenOutcome};
