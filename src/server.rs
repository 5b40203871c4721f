//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, cache setup, service wiring,
//! and the Axum server lifecycle.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::application::services::{AuthService, ClickService, LinkService};
use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    PgLinkRepository, PgSessionRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, CookieOptions};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried with exponential backoff, so a
///   container start does not race the database)
/// - Embedded migrations
/// - Redis cache, or NullCache when unconfigured or unreachable
/// - Services and the Axum router
///
/// # Errors
///
/// Returns an error if the database never becomes reachable, migrations
/// fail, or the listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let retry_strategy = ExponentialBackoff::from_millis(200).map(jitter).take(5);

    let pool = Retry::spawn(retry_strategy, || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(&config.database_url)
    })
    .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let session_repository = Arc::new(PgSessionRepository::new(pool.clone()));

    let link_service = Arc::new(LinkService::new(
        link_repository.clone(),
        config.base_url.clone(),
        config.is_production(),
    ));
    let click_service = Arc::new(ClickService::new(link_repository));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        session_repository,
        config.session_signing_secret.clone(),
        config.session_ttl_hours,
    ));

    let state = AppState {
        link_service,
        click_service,
        auth_service,
        cache,
        cookie: CookieOptions {
            name: config.cookie_name.clone(),
            secure: config.is_production(),
            max_age_seconds: config.session_ttl_hours * 3600,
        },
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        axum::ServiceExt::<axum::extract::Request>::into_make_service_with_connect_info::<
            SocketAddr,
        >(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM, letting in-flight
/// requests finish before the server exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
