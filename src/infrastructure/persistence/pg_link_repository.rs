//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{LinkRepository, LinkSort, ListFilter, SortOrder};
use crate::error::{AppError, map_sqlx_error};

/// PostgreSQL repository for link storage, lookups, and click counters.
///
/// Uses the runtime query API with bound parameters throughout; the two
/// uniqueness guarantees (short code, owner + URL dedupe) live in the
/// database's unique indexes rather than in application checks.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Loads monthly buckets for a set of links in one query.
    async fn load_months(
        &self,
        link_ids: Vec<i64>,
    ) -> Result<std::collections::HashMap<i64, BTreeMap<String, i64>>, AppError> {
        let mut months: std::collections::HashMap<i64, BTreeMap<String, i64>> =
            std::collections::HashMap::new();

        if link_ids.is_empty() {
            return Ok(months);
        }

        let rows = sqlx::query_as::<_, MonthRow>(
            "SELECT link_id, month, clicks FROM link_monthly_clicks WHERE link_id = ANY($1)",
        )
        .bind(link_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        for row in rows {
            months
                .entry(row.link_id)
                .or_default()
                .insert(row.month, row.clicks);
        }

        Ok(months)
    }

    async fn hydrate(&self, row: LinkRow) -> Result<Link, AppError> {
        let mut months = self.load_months(vec![row.id]).await?;
        let clicks_by_month = months.remove(&row.id).unwrap_or_default();
        Ok(row.into_link(clicks_by_month))
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    owner_id: Option<i64>,
    short_code: String,
    long_url: String,
    total_clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_link(self, clicks_by_month: BTreeMap<String, i64>) -> Link {
        Link {
            id: self.id,
            owner_id: self.owner_id,
            short_code: self.short_code,
            long_url: self.long_url,
            total_clicks: self.total_clicks,
            clicks_by_month,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MonthRow {
    link_id: i64,
    month: String,
    clicks: i64,
}

const LINK_COLUMNS: &str =
    "id, owner_id, short_code, long_url, total_clicks, created_at, updated_at";

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "INSERT INTO links (owner_id, short_code, long_url) \
             VALUES ($1, $2, $3) \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(new_link.owner_id)
        .bind(&new_link.short_code)
        .bind(&new_link.long_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into_link(BTreeMap::new()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM links WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists.0)
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = $1 AND long_url = $2"
        ))
        .bind(owner_id)
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, owner_id: i64, filter: ListFilter) -> Result<Vec<Link>, AppError> {
        // Sort column and direction come from closed enums, never from the
        // request, so interpolating them is injection-safe.
        let sort_column = match filter.sort {
            LinkSort::CreatedAt => "created_at",
            LinkSort::TotalClicks => "total_clicks",
            LinkSort::LongUrl => "long_url",
        };
        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 \
               AND ($2::text IS NULL OR long_url ILIKE '%' || $2 || '%') \
             ORDER BY {sort_column} {direction} \
             LIMIT $3 OFFSET $4"
        ))
        .bind(owner_id)
        .bind(filter.search.clone())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut months = self.load_months(rows.iter().map(|r| r.id).collect()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let clicks = months.remove(&row.id).unwrap_or_default();
                row.into_link(clicks)
            })
            .collect())
    }

    async fn count(&self, owner_id: i64, filter: &ListFilter) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM links \
             WHERE owner_id = $1 \
               AND ($2::text IS NULL OR long_url ILIKE '%' || $2 || '%')",
        )
        .bind(owner_id)
        .bind(filter.search.clone())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count.0)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "DELETE FROM links WHERE id = $1 AND owner_id = $2 RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        // Monthly rows go with the link via ON DELETE CASCADE.
        Ok(row.map(|r| r.into_link(BTreeMap::new())))
    }

    async fn increment_clicks(&self, code: &str, month_key: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<(i64,)> = sqlx::query_as(
            "UPDATE links \
             SET total_clicks = total_clicks + 1, updated_at = now() \
             WHERE short_code = $1 \
             RETURNING id",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((link_id,)) = updated else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            "INSERT INTO link_monthly_clicks (link_id, month, clicks) \
             VALUES ($1, $2, 1) \
             ON CONFLICT (link_id, month) \
             DO UPDATE SET clicks = link_monthly_clicks.clicks + 1",
        )
        .bind(link_id)
        .bind(month_key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
