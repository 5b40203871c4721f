//! DTOs for the owner-scoped dashboard endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::Link;
use crate::domain::repositories::{LinkSort, ListFilter, SortOrder};

/// Default page size; the original dashboard shows 20 rows.
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Query parameters for `GET /api/links`.
///
/// Uses `serde_with` to parse numbers out of query strings. Out-of-range
/// values are clamped rather than rejected and unknown sort fields fall
/// back to `createdAt`, matching the original dashboard behavior.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default)]
    pub sort_order: Option<String>,

    #[serde(default)]
    pub search: Option<String>,
}

impl LinkListQuery {
    /// Resolves the query into a repository filter plus the effective page
    /// and limit for the pagination envelope.
    pub fn resolve(&self) -> (ListFilter, u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let sort = match self.sort_by.as_deref() {
            Some("totalClicks") => LinkSort::TotalClicks,
            Some("longUrl") => LinkSort::LongUrl,
            _ => LinkSort::CreatedAt,
        };

        let order = match self.sort_order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let filter = ListFilter {
            search,
            sort,
            order,
            offset: (i64::from(page) - 1) * i64::from(limit),
            limit: i64::from(limit),
        };

        (filter, page, limit)
    }

    /// Echoed filter block for the response.
    pub fn echo(&self) -> ListFilters {
        ListFilters {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            sort_by: match self.sort_by.as_deref() {
                Some("totalClicks") => "totalClicks",
                Some("longUrl") => "longUrl",
                _ => "createdAt",
            }
            .to_string(),
            sort_order: match self.sort_order.as_deref() {
                Some("asc") => "asc",
                _ => "desc",
            }
            .to_string(),
        }
    }
}

/// One month bucket in an analytics series.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyClicks {
    pub month: String,
    pub clicks: i64,
}

/// A link row in the dashboard listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub id: i64,
    pub short_url: String,
    pub short_code: String,
    pub long_url: String,
    /// `YYYY-MM-DD` convenience field for table display.
    pub date_created: String,
    pub total_clicks: i64,
    /// Clicks relative to the best-performing link on this page, 0..=100.
    pub performance_percent: i64,
    pub monthly_clicks: Vec<MonthlyClicks>,
    pub created_at: DateTime<Utc>,
}

impl LinkSummary {
    /// `max_clicks` is the page-wide maximum (at least 1, so links with
    /// zero clicks score 0 rather than dividing by zero).
    pub fn from_link(link: &Link, short_url: String, max_clicks: i64) -> Self {
        let performance_percent =
            ((link.total_clicks as f64 / max_clicks as f64) * 100.0).round() as i64;

        Self {
            id: link.id,
            short_url,
            short_code: link.short_code.clone(),
            long_url: link.long_url.clone(),
            date_created: link.created_at.format("%Y-%m-%d").to_string(),
            total_clicks: link.total_clicks,
            performance_percent,
            monthly_clicks: monthly_series(link, None, None),
            created_at: link.created_at,
        }
    }
}

/// Ascending month series for a link, optionally bounded.
pub fn monthly_series(link: &Link, from: Option<&str>, to: Option<&str>) -> Vec<MonthlyClicks> {
    link.monthly_between(from, to)
        .into_iter()
        .map(|(month, clicks)| MonthlyClicks { month, clicks })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit);
        Self {
            page,
            limit,
            total,
            pages: (total + limit_i - 1) / limit_i,
            has_next: i64::from(page) * limit_i < total,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    pub search: String,
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    pub links: Vec<LinkSummary>,
    pub pagination: PaginationMeta,
    pub filters: ListFilters,
}

/// Response for `GET /api/links/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetailResponse {
    pub id: i64,
    pub short_url: String,
    pub short_code: String,
    pub long_url: String,
    pub date_created: String,
    pub total_clicks: i64,
    pub monthly_clicks: Vec<MonthlyClicks>,
    pub created_at: DateTime<Utc>,
}

impl LinkDetailResponse {
    pub fn from_link(link: &Link, short_url: String) -> Self {
        Self {
            id: link.id,
            short_url,
            short_code: link.short_code.clone(),
            long_url: link.long_url.clone(),
            date_created: link.created_at.format("%Y-%m-%d").to_string(),
            total_clicks: link.total_clicks,
            monthly_clicks: monthly_series(link, None, None),
            created_at: link.created_at,
        }
    }
}

/// Query parameters for the analytics endpoint: inclusive month-key bounds.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBody {
    pub total_clicks: i64,
    pub monthly_clicks: Vec<MonthlyClicks>,
    pub date_range: AnalyticsDateRange,
}

/// Response for `GET /api/links/{id}/analytics`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalyticsResponse {
    pub link_id: i64,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub analytics: AnalyticsBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedLink {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
}

/// Response for `DELETE /api/links/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLinkResponse {
    pub message: String,
    pub deleted_link: DeletedLink,
}
