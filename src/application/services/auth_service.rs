//! Account and session management.
//!
//! Sessions are opaque bearer tokens: 32 random bytes, URL-safe base64.
//! Only the HMAC-SHA256 of a token (keyed by the server signing secret) is
//! stored, so read access to the sessions table is not enough to forge or
//! replay a login. Passwords are hashed with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::{SessionRepository, UserRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of entropy per session token before base64 encoding.
const TOKEN_LENGTH_BYTES: usize = 32;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    signing_secret: String,
    session_ttl_hours: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        signing_secret: String,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            signing_secret,
            session_ttl_hours,
        }
    }

    /// Registers a new account and opens a session for it.
    ///
    /// The email is lowercased and trimmed before storage. The pre-insert
    /// existence check gives a friendly error for the common case; the
    /// unique index on `users.email` decides races.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] (`EMAIL_EXISTS`) for duplicate emails.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let email = email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(email_exists());
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => email_exists(),
                other => other,
            })?;

        let token = self.open_session(user.id).await?;

        Ok((user, token))
    }

    /// Verifies credentials and opens a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with `USER_NOT_FOUND` for unknown
    /// accounts and `INVALID_PASSWORD` for a failed verification, matching
    /// the API's distinct error codes.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let email = email.trim().to_lowercase();

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            AppError::unauthorized_with_code(
                "Account doesn't exist. Please sign up.",
                "USER_NOT_FOUND",
            )
        })?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::unauthorized_with_code(
                "Incorrect password.",
                "INVALID_PASSWORD",
            ));
        }

        let token = self.open_session(user.id).await?;

        Ok((user, token))
    }

    /// Revokes the session behind a raw token. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.revoke(&self.hash_token(token)).await
    }

    /// Resolves a raw token to its user id.
    ///
    /// Touches `last_used_at` best-effort; a failed touch never fails
    /// authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown or expired sessions.
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        let token_hash = self.hash_token(token);

        let user_id = self
            .sessions
            .find_user_id(&token_hash)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session expired. Please log in."))?;

        let _ = self.sessions.touch(&token_hash).await;

        Ok(user_id)
    }

    /// Loads the profile behind an authenticated user id.
    pub async fn current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session expired. Please log in."))
    }

    async fn open_session(&self, user_id: i64) -> Result<String, AppError> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_ttl_hours);

        self.sessions
            .insert(&self.hash_token(&token), user_id, expires_at)
            .await?;

        Ok(token)
    }

    /// Hashes a raw token with HMAC-SHA256 under the server signing secret.
    /// Returns a 64-character lowercase hex MAC.
    fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Generates an opaque session token.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
fn generate_token() -> String {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn email_exists() -> AppError {
    AppError::conflict(
        "An account with this email already exists. Try logging in.",
        "EMAIL_EXISTS",
    )
}
