//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Name of the unique index guarding short code uniqueness.
///
/// The creation flow matches this against [`AppError::Conflict`] to tell a
/// code collision (retryable with a fresh candidate) from other conflicts.
pub const SHORT_CODE_CONSTRAINT: &str = "links_short_code_key";

/// Name of the partial unique index guarding `(owner_id, long_url)` dedupe.
pub const OWNER_URL_CONSTRAINT: &str = "links_owner_id_long_url_key";

/// Sort keys accepted by the dashboard listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSort {
    #[default]
    CreatedAt,
    TotalClicks,
    LongUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter criteria for owner-scoped link listings.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring match on `long_url`.
    pub search: Option<String>,
    pub sort: LinkSort,
    pub order: SortOrder,
    pub offset: i64,
    pub limit: i64,
}

/// Repository interface for managing short links and their click counters.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`; integration tests use an
///   in-memory fake (`tests/common`)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] with the violated constraint name when
    /// the short code or the `(owner, long_url)` pair already exists; the
    /// unique indexes are the authoritative uniqueness guarantee, not the
    /// pre-insert existence checks.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Looks up a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Cheap existence probe used by the uniqueness resolver before insert.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Dedupe lookup: exact match on the trimmed URL for one owner.
    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Owner-scoped lookup by id. Returns `None` for other owners' links.
    async fn find_by_id_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links with search, sort, and pagination.
    async fn list(&self, owner_id: i64, filter: ListFilter) -> Result<Vec<Link>, AppError>;

    /// Counts an owner's links matching the filter's search term; the
    /// filter's sort and pagination fields are ignored.
    async fn count(&self, owner_id: i64, filter: &ListFilter) -> Result<i64, AppError>;

    /// Deletes an owner's link, returning it for the response body.
    /// `Ok(None)` when the link does not exist or belongs to someone else.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError>;

    /// Atomically increments `total_clicks` and the month bucket for the
    /// given code as one transaction, creating the bucket if absent.
    ///
    /// Both counters move together or not at all, keeping
    /// `total_clicks == sum(clicks_by_month)`. Increments happen in the
    /// database (`counter = counter + 1`), never read-modify-write in the
    /// application, so no concurrent click is lost.
    ///
    /// Returns `false` when no link carries the code.
    async fn increment_clicks(&self, code: &str, month_key: &str) -> Result<bool, AppError>;

    /// Storage liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
