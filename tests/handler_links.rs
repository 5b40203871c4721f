mod common;

use axum_test::TestServer;
use serde_json::Value;
use shortlink::application::services::click_service::month_key;

async fn list(server: &TestServer, token: &str, query: &str) -> Value {
    let response = server
        .get(&format!("/api/links{query}"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 200, "{}", response.text());
    response.json()
}

async fn click(server: &TestServer, code: &str, times: usize) {
    for _ in 0..times {
        let response = server.get(&format!("/{code}")).await;
        assert_eq!(response.status_code(), 302);
    }
}

#[tokio::test]
async fn test_list_requires_auth() {
    let ctx = common::setup();

    let response = ctx.server.get("/api/links").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_list_is_owner_scoped() {
    let ctx = common::setup();
    let token_a = common::signup(&ctx.server, "a@example.com").await;
    let token_b = common::signup(&ctx.server, "b@example.com").await;

    common::shorten(&ctx.server, &token_a, "https://example.com/1").await;
    common::shorten(&ctx.server, &token_a, "https://example.com/2").await;
    common::shorten(&ctx.server, &token_b, "https://example.com/3").await;

    let body = list(&ctx.server, &token_a, "").await;

    assert_eq!(body["links"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_list_pagination() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    for i in 0..3 {
        common::shorten(&ctx.server, &token, &format!("https://example.com/{i}")).await;
    }

    let page1 = list(&ctx.server, &token, "?page=1&limit=2").await;
    assert_eq!(page1["links"].as_array().unwrap().len(), 2);
    assert_eq!(page1["pagination"]["total"], 3);
    assert_eq!(page1["pagination"]["pages"], 2);
    assert_eq!(page1["pagination"]["hasNext"], true);
    assert_eq!(page1["pagination"]["hasPrev"], false);

    let page2 = list(&ctx.server, &token, "?page=2&limit=2").await;
    assert_eq!(page2["links"].as_array().unwrap().len(), 1);
    assert_eq!(page2["pagination"]["hasNext"], false);
    assert_eq!(page2["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn test_list_search_filters_by_url() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    common::shorten(&ctx.server, &token, "https://example.com/page").await;
    common::shorten(&ctx.server, &token, "https://rust-lang.org/learn").await;

    let body = list(&ctx.server, &token, "?search=RUST").await;

    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["longUrl"], "https://rust-lang.org/learn");
    assert_eq!(body["filters"]["search"], "RUST");
}

#[tokio::test]
async fn test_list_sorts_by_total_clicks() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let quiet = common::shorten(&ctx.server, &token, "https://example.com/quiet").await;
    let busy = common::shorten(&ctx.server, &token, "https://example.com/busy").await;
    click(&ctx.server, busy["shortCode"].as_str().unwrap(), 3).await;

    let body = list(&ctx.server, &token, "?sortBy=totalClicks&sortOrder=desc").await;

    let links = body["links"].as_array().unwrap();
    assert_eq!(links[0]["shortCode"], busy["shortCode"]);
    assert_eq!(links[0]["totalClicks"], 3);
    assert_eq!(links[1]["shortCode"], quiet["shortCode"]);
    assert_eq!(body["filters"]["sortBy"], "totalClicks");
}

#[tokio::test]
async fn test_list_performance_percent() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let busy = common::shorten(&ctx.server, &token, "https://example.com/busy").await;
    let half = common::shorten(&ctx.server, &token, "https://example.com/half").await;
    common::shorten(&ctx.server, &token, "https://example.com/zero").await;

    click(&ctx.server, busy["shortCode"].as_str().unwrap(), 4).await;
    click(&ctx.server, half["shortCode"].as_str().unwrap(), 2).await;

    let body = list(&ctx.server, &token, "?sortBy=totalClicks&sortOrder=desc").await;
    let links = body["links"].as_array().unwrap();

    assert_eq!(links[0]["performancePercent"], 100);
    assert_eq!(links[1]["performancePercent"], 50);
    assert_eq!(links[2]["performancePercent"], 0);
}

#[tokio::test]
async fn test_list_includes_monthly_clicks() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let created = common::shorten(&ctx.server, &token, "https://example.com/m").await;
    click(&ctx.server, created["shortCode"].as_str().unwrap(), 2).await;

    let body = list(&ctx.server, &token, "").await;
    let monthly = body["links"][0]["monthlyClicks"].as_array().unwrap();

    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["month"], month_key(chrono::Utc::now()));
    assert_eq!(monthly[0]["clicks"], 2);
}

#[tokio::test]
async fn test_get_link_detail() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let created = common::shorten(&ctx.server, &token, "https://example.com/detail").await;
    let id = created["linkId"].as_i64().unwrap();

    let response = ctx
        .server
        .get(&format!("/api/links/{id}"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["longUrl"], "https://example.com/detail");
    assert_eq!(body["shortCode"], created["shortCode"]);
    assert!(body["dateCreated"].as_str().unwrap().len() == 10);
}

#[tokio::test]
async fn test_get_link_hides_other_owners() {
    let ctx = common::setup();
    let token_a = common::signup(&ctx.server, "a@example.com").await;
    let token_b = common::signup(&ctx.server, "b@example.com").await;

    let created = common::shorten(&ctx.server, &token_a, "https://example.com/private").await;
    let id = created["linkId"].as_i64().unwrap();

    let response = ctx
        .server
        .get(&format!("/api/links/{id}"))
        .add_header("Authorization", format!("Bearer {token_b}"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["code"], "LINK_NOT_FOUND");
}

#[tokio::test]
async fn test_get_link_invalid_id() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let response = ctx
        .server
        .get("/api/links/not-a-number")
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_link_analytics() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let created = common::shorten(&ctx.server, &token, "https://example.com/an").await;
    let id = created["linkId"].as_i64().unwrap();
    click(&ctx.server, created["shortCode"].as_str().unwrap(), 3).await;

    let response = ctx
        .server
        .get(&format!("/api/links/{id}/analytics"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["totalClicks"], 3);
    assert_eq!(body["analytics"]["totalClicks"], 3);

    let monthly = body["analytics"]["monthlyClicks"].as_array().unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["clicks"], 3);
}

#[tokio::test]
async fn test_link_analytics_range_filter() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let created = common::shorten(&ctx.server, &token, "https://example.com/range").await;
    let id = created["linkId"].as_i64().unwrap();
    click(&ctx.server, created["shortCode"].as_str().unwrap(), 1).await;

    // A window in the far future excludes the current month.
    let response = ctx
        .server
        .get(&format!("/api/links/{id}/analytics?from=9998-01&to=9999-01"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(
        body["analytics"]["monthlyClicks"]
            .as_array()
            .unwrap()
            .is_empty()
    );
    assert_eq!(body["analytics"]["dateRange"]["from"], "9998-01");
    assert_eq!(body["analytics"]["dateRange"]["to"], "9999-01");
    // The overall total is unaffected by the window.
    assert_eq!(body["totalClicks"], 1);
}

#[tokio::test]
async fn test_delete_link() {
    let ctx = common::setup();
    let token = common::signup(&ctx.server, "a@example.com").await;

    let created = common::shorten(&ctx.server, &token, "https://example.com/bye").await;
    let id = created["linkId"].as_i64().unwrap();

    let response = ctx
        .server
        .delete(&format!("/api/links/{id}"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Link deleted successfully");
    assert_eq!(body["deletedLink"]["shortCode"], created["shortCode"]);
    assert_eq!(ctx.links.link_count(), 0);

    // A second delete finds nothing.
    let again = ctx
        .server
        .delete(&format!("/api/links/{id}"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn test_delete_is_owner_scoped() {
    let ctx = common::setup();
    let token_a = common::signup(&ctx.server, "a@example.com").await;
    let token_b = common::signup(&ctx.server, "b@example.com").await;

    let created = common::shorten(&ctx.server, &token_a, "https://example.com/keep").await;
    let id = created["linkId"].as_i64().unwrap();

    let response = ctx
        .server
        .delete(&format!("/api/links/{id}"))
        .add_header("Authorization", format!("Bearer {token_b}"))
        .await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(ctx.links.link_count(), 1);
}
