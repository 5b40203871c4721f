//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for account storage.
///
/// Emails are stored lowercased and trimmed; uniqueness is enforced by the
/// store's unique index, surfaced as [`AppError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the email is already registered.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}
