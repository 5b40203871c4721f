//! Repository trait for server-side sessions.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for session storage.
///
/// Sessions are keyed by the HMAC-SHA256 hash of the bearer token; the raw
/// token never reaches the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persists a new session for a user.
    async fn insert(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Resolves a token hash to its user, ignoring expired sessions.
    async fn find_user_id(&self, token_hash: &str) -> Result<Option<i64>, AppError>;

    /// Updates `last_used_at`. Best-effort: callers may ignore failures.
    async fn touch(&self, token_hash: &str) -> Result<(), AppError>;

    /// Revokes a session. Revoking an unknown hash is not an error.
    async fn revoke(&self, token_hash: &str) -> Result<(), AppError>;
}
