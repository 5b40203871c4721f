//! Request and response DTOs. JSON field names are camelCase on the wire.

pub mod auth;
pub mod health;
pub mod links;
pub mod shorten;
