//! Link creation, listing, and deletion service.

use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{
    LinkRepository, ListFilter, OWNER_URL_CONSTRAINT, SHORT_CODE_CONSTRAINT,
};
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::validate_long_url;

/// Retry budget for the uniqueness resolver. With 62^7 possible codes a
/// single collision is already unlikely; five misses in a row means the
/// request should fail rather than spin.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Result of a shorten call: the link plus whether it was deduplicated.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub link: Link,
    pub is_existing: bool,
}

/// Service orchestrating URL validation, dedupe, code allocation, and the
/// owner-scoped dashboard queries.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    base_url: String,
    reject_localhost: bool,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>, base_url: String, reject_localhost: bool) -> Self {
        Self {
            links,
            base_url,
            reject_localhost,
        }
    }

    /// Creates a short link, or returns the owner's existing one for the
    /// same destination.
    ///
    /// Validation happens before any storage access; a validation failure
    /// has no side effects. The existence check inside the attempt loop is
    /// an optimization only: if two requests race past it with the same
    /// candidate, the store's unique index rejects the loser, which shows
    /// up here as a retryable [`AppError::Conflict`] and costs one attempt.
    ///
    /// A conflict on the `(owner, long_url)` index means a concurrent
    /// request shortened the same destination first; the winner is
    /// re-read and returned as a dedupe hit.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] when validation fails
    /// - [`AppError::ExhaustedRetries`] when no free code is found in budget
    pub async fn shorten(
        &self,
        owner_id: Option<i64>,
        raw_url: &str,
    ) -> Result<ShortenOutcome, AppError> {
        let long_url = validate_long_url(raw_url, &self.base_url, self.reject_localhost)
            .map_err(|e| AppError::invalid_url(e.to_string()))?;

        if let Some(owner) = owner_id {
            if let Some(existing) = self.links.find_by_owner_and_url(owner, &long_url).await? {
                return Ok(ShortenOutcome {
                    link: existing,
                    is_existing: true,
                });
            }
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code();

            if self.links.code_exists(&code).await? {
                tracing::debug!(code = %code, attempt, "short code collision, retrying");
                continue;
            }

            let new_link = NewLink {
                owner_id,
                short_code: code,
                long_url: long_url.clone(),
            };

            match self.links.create(new_link).await {
                Ok(link) => {
                    return Ok(ShortenOutcome {
                        link,
                        is_existing: false,
                    });
                }
                Err(AppError::Conflict {
                    constraint: Some(constraint),
                    ..
                }) if constraint == SHORT_CODE_CONSTRAINT => {
                    tracing::debug!(attempt, "insert lost a code race, retrying");
                    continue;
                }
                Err(AppError::Conflict {
                    constraint: Some(constraint),
                    ..
                }) if constraint == OWNER_URL_CONSTRAINT => {
                    let Some(owner) = owner_id else {
                        return Err(AppError::internal("dedupe conflict without an owner"));
                    };
                    let existing = self
                        .links
                        .find_by_owner_and_url(owner, &long_url)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal("dedupe winner vanished after conflict")
                        })?;
                    return Ok(ShortenOutcome {
                        link: existing,
                        is_existing: true,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::ExhaustedRetries)
    }

    /// Lists the owner's links with the matching total for pagination.
    pub async fn list_links(
        &self,
        owner_id: i64,
        filter: ListFilter,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let total = self.links.count(owner_id, &filter).await?;
        let links = self.links.list(owner_id, filter).await?;

        Ok((links, total))
    }

    /// Fetches one of the owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LinkNotFound`] when the link does not exist or
    /// belongs to another owner; callers cannot tell the two apart.
    pub async fn get_link(&self, id: i64, owner_id: i64) -> Result<Link, AppError> {
        self.links
            .find_by_id_for_owner(id, owner_id)
            .await?
            .ok_or(AppError::LinkNotFound)
    }

    /// Deletes one of the owner's links, returning it for the response.
    pub async fn delete_link(&self, id: i64, owner_id: i64) -> Result<Link, AppError> {
        self.links
            .delete(id, owner_id)
            .await?
            .ok_or(AppError::LinkNotFound)
    }

    /// Resolves a short code for the redirect path.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        self.links
            .find_by_code(code)
            .await?
            .ok_or(AppError::LinkNotFound)
    }

    /// Constructs the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Store liveness, surfaced by the health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.links.ping().await
    }
}
