//! User account entity.

use chrono::{DateTime, Utc};

/// A registered account. Links reference users through `owner_id`.
///
/// The password hash never leaves the domain layer; API responses use a
/// dedicated DTO without it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Lowercased, trimmed email.
    pub email: String,
    pub password_hash: String,
}
