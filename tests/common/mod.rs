#![allow(dead_code)]

//! Shared test harness: in-memory repository fakes wired into the real
//! services, middleware, and router, served through `axum-test`.
//!
//! The fakes mirror the storage contract the Postgres repositories
//! implement: unique-index conflicts carry constraint names, click
//! increments move both counters together, and `find_by_code` calls are
//! counted so tests can assert that malformed codes never reach the store.

use async_trait::async_trait;
use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use shortlink::api::handlers::{health_handler, redirect_handler};
use shortlink::api::middleware::auth;
use shortlink::api::routes::{auth_routes, protected_routes};
use shortlink::application::services::{AuthService, ClickService, LinkService};
use shortlink::domain::entities::{Link, NewLink, NewUser, User};
use shortlink::domain::repositories::{
    LinkRepository, LinkSort, ListFilter, OWNER_URL_CONSTRAINT, SHORT_CODE_CONSTRAINT,
    SessionRepository, SortOrder, UserRepository,
};
use shortlink::error::AppError;
use shortlink::infrastructure::cache::NullCache;
use shortlink::state::{AppState, CookieOptions};

pub const BASE_URL: &str = "https://sho.rt";

fn conflict(constraint: &str) -> AppError {
    AppError::Conflict {
        message: "Unique constraint violation".to_string(),
        code: "CONFLICT",
        constraint: Some(constraint.to_string()),
    }
}

#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
    next_id: AtomicI64,
    /// Number of `find_by_code` calls, i.e. store lookups on the redirect
    /// path.
    pub code_lookups: AtomicUsize,
    /// When set, `increment_clicks` fails like a broken store.
    pub fail_increments: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn get_by_code(&self, code: &str) -> Option<Link> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == code)
            .cloned()
    }

    pub fn lookup_count(&self) -> usize {
        self.code_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();

        if links.iter().any(|l| l.short_code == new_link.short_code) {
            return Err(conflict(SHORT_CODE_CONSTRAINT));
        }
        if new_link.owner_id.is_some()
            && links
                .iter()
                .any(|l| l.owner_id == new_link.owner_id && l.long_url == new_link.long_url)
        {
            return Err(conflict(OWNER_URL_CONSTRAINT));
        }

        let now = Utc::now();
        let link = Link {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            owner_id: new_link.owner_id,
            short_code: new_link.short_code,
            long_url: new_link.long_url,
            total_clicks: 0,
            clicks_by_month: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };
        links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.code_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.get_by_code(code))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.short_code == code))
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.owner_id == Some(owner_id) && l.long_url == long_url)
            .cloned())
    }

    async fn find_by_id_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id && l.owner_id == Some(owner_id))
            .cloned())
    }

    async fn list(&self, owner_id: i64, filter: ListFilter) -> Result<Vec<Link>, AppError> {
        let links = self.links.lock().unwrap();

        let mut matching: Vec<Link> = links
            .iter()
            .filter(|l| l.owner_id == Some(owner_id))
            .filter(|l| match &filter.search {
                Some(needle) => l
                    .long_url
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match filter.sort {
                LinkSort::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
                LinkSort::TotalClicks => a.total_clicks.cmp(&b.total_clicks),
                LinkSort::LongUrl => a.long_url.cmp(&b.long_url),
            };
            match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, owner_id: i64, filter: &ListFilter) -> Result<i64, AppError> {
        let links = self.links.lock().unwrap();

        Ok(links
            .iter()
            .filter(|l| l.owner_id == Some(owner_id))
            .filter(|l| match &filter.search {
                Some(needle) => l
                    .long_url
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                None => true,
            })
            .count() as i64)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();

        let position = links
            .iter()
            .position(|l| l.id == id && l.owner_id == Some(owner_id));

        Ok(position.map(|i| links.remove(i)))
    }

    async fn increment_clicks(&self, code: &str, month_key: &str) -> Result<bool, AppError> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(AppError::internal("analytics store unavailable"));
        }

        let mut links = self.links.lock().unwrap();

        let Some(link) = links.iter_mut().find(|l| l.short_code == code) else {
            return Ok(false);
        };

        // Both counters move under one lock, like the SQL transaction.
        link.total_clicks += 1;
        *link
            .clicks_by_month
            .entry(month_key.to_string())
            .or_insert(0) += 1;
        link.updated_at = Utc::now();

        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == new_user.email) {
            return Err(conflict("users_email_key"));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }
}

struct SessionRecord {
    token_hash: String,
    user_id: i64,
    expires_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<Vec<SessionRecord>>,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.sessions.lock().unwrap().push(SessionRecord {
            token_hash: token_hash.to_string(),
            user_id,
            expires_at,
        });
        Ok(())
    }

    async fn find_user_id(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > Utc::now())
            .map(|s| s.user_id))
    }

    async fn touch(&self, _token_hash: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn revoke(&self, token_hash: &str) -> Result<(), AppError> {
        self.sessions
            .lock()
            .unwrap()
            .retain(|s| s.token_hash != token_hash);
        Ok(())
    }
}

impl InMemorySessionRepository {
    /// Backdates every session so it reads as expired.
    pub fn expire_all(&self) {
        for session in self.sessions.lock().unwrap().iter_mut() {
            session.expires_at = Utc::now() - Duration::hours(1);
        }
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub links: Arc<InMemoryLinkRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub state: AppState,
}

/// Builds the full application (real services, auth middleware, router)
/// over in-memory storage. Rate limiting is left off: it keys on the peer
/// socket address, which the in-process test transport does not have.
pub fn setup() -> TestContext {
    let links = Arc::new(InMemoryLinkRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        BASE_URL.to_string(),
        false,
    ));
    let click_service = Arc::new(ClickService::new(links.clone()));
    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        sessions.clone(),
        "test-signing-secret".to_string(),
        24,
    ));

    let state = AppState {
        link_service,
        click_service,
        auth_service,
        cache: Arc::new(NullCache::new()),
        cookie: CookieOptions {
            name: "shortlink_session".to_string(),
            secure: false,
            max_age_seconds: 24 * 3600,
        },
    };

    let api_router = protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/api", api_router)
        .with_state(state.clone());

    let server = TestServer::new(app).unwrap();

    TestContext {
        server,
        links,
        users,
        sessions,
        state,
    }
}

/// Registers an account and returns its bearer token.
pub async fn signup(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/auth/signup")
        .json(&serde_json::json!({ "email": email, "password": "secret123" }))
        .await;

    assert_eq!(response.status_code(), 201, "{}", response.text());

    let body: serde_json::Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

/// Shortens a URL as the given user and returns the response body.
pub async fn shorten(server: &TestServer, token: &str, long_url: &str) -> serde_json::Value {
    let response = server
        .post("/api/shorten")
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "longUrl": long_url }))
        .await;

    assert!(
        response.status_code() == 201 || response.status_code() == 200,
        "{}",
        response.text()
    );

    response.json()
}
