//! Handlers for the owner-scoped dashboard endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::warn;

use crate::api::dto::links::{
    AnalyticsBody, AnalyticsDateRange, AnalyticsQuery, DeleteLinkResponse, DeletedLink,
    LinkAnalyticsResponse, LinkDetailResponse, LinkListQuery, LinkListResponse, LinkSummary,
    PaginationMeta, monthly_series,
};
use crate::api::middleware::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links with search, sort, and pagination.
///
/// # Endpoint
///
/// `GET /api/links?page=&limit=&sortBy=&sortOrder=&search=`
///
/// `monthlyClicks` is the ascending month series per link;
/// `performancePercent` scores each link against the busiest link on the
/// returned page.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Query(query): Query<LinkListQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (filter, page, limit) = query.resolve();

    let (links, total) = state.link_service.list_links(owner_id, filter).await?;

    let max_clicks = links
        .iter()
        .map(|l| l.total_clicks)
        .max()
        .unwrap_or(0)
        .max(1);

    let links = links
        .iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.short_code);
            LinkSummary::from_link(link, short_url, max_clicks)
        })
        .collect();

    Ok(Json(LinkListResponse {
        links,
        pagination: PaginationMeta::new(page, limit, total),
        filters: query.echo(),
    }))
}

/// Returns one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<LinkDetailResponse>, AppError> {
    let id = parse_link_id(&id)?;
    let link = state.link_service.get_link(id, owner_id).await?;
    let short_url = state.link_service.short_url(&link.short_code);

    Ok(Json(LinkDetailResponse::from_link(&link, short_url)))
}

/// Returns the monthly click breakdown for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}/analytics?from=YYYY-MM&to=YYYY-MM`
///
/// Bounds are inclusive month keys compared as strings.
pub async fn link_analytics_handler(
    State(state): State<AppState>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(range): Query<AnalyticsQuery>,
) -> Result<Json<LinkAnalyticsResponse>, AppError> {
    let id = parse_link_id(&id)?;
    let link = state.link_service.get_link(id, owner_id).await?;

    let monthly_clicks = monthly_series(&link, range.from.as_deref(), range.to.as_deref());

    Ok(Json(LinkAnalyticsResponse {
        link_id: link.id,
        short_code: link.short_code.clone(),
        short_url: state.link_service.short_url(&link.short_code),
        long_url: link.long_url.clone(),
        total_clicks: link.total_clicks,
        created_at: link.created_at,
        analytics: AnalyticsBody {
            total_clicks: link.total_clicks,
            monthly_clicks,
            date_range: AnalyticsDateRange {
                from: range.from,
                to: range.to,
            },
        },
    }))
}

/// Deletes one of the caller's links and drops its cache entry.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteLinkResponse>, AppError> {
    let id = parse_link_id(&id)?;
    let link = state.link_service.delete_link(id, owner_id).await?;

    if let Err(e) = state.cache.invalidate(&link.short_code).await {
        warn!(code = %link.short_code, error = %e, "failed to invalidate cache");
    }

    Ok(Json(DeleteLinkResponse {
        message: "Link deleted successfully".to_string(),
        deleted_link: DeletedLink {
            id: link.id,
            short_code: link.short_code,
            long_url: link.long_url,
        },
    }))
}

fn parse_link_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation("Invalid link ID"))
}
