//! HTTP handlers.

pub mod auth;
pub mod health;
pub mod links;
pub mod redirect;
pub mod shorten;

pub use auth::{login_handler, logout_handler, me_handler, signup_handler};
pub use health::health_handler;
pub use links::{
    delete_link_handler, get_link_handler, link_analytics_handler, list_links_handler,
};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
