//! HTTP server initialization and runtime setup.
//!
//! Wires the stores, cache tier, services, and background tasks together and
//! runs the Axum server until shutdown.

use crate::application::services::{
    AccessPolicy, LinkService, ProjectService, ResolutionEngine, Sweeper,
};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{LinkStore, ProjectStore};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgLinkStore, PgProjectStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker and expiry sweeper
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migration run, or server
/// bind fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let (cache, cache_enabled): (Arc<dyn CacheService>, bool) =
        if let Some(redis_url) = &config.redis_url {
            match RedisCache::connect(redis_url).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    (Arc::new(redis), true)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    (Arc::new(NullCache::new()), false)
                }
            }
        } else {
            tracing::info!("Cache disabled (NullCache)");
            (Arc::new(NullCache::new()), false)
        };

    let pool = Arc::new(pool);
    let links: Arc<dyn LinkStore> = Arc::new(PgLinkStore::new(pool.clone()));
    let projects: Arc<dyn ProjectStore> = Arc::new(PgProjectStore::new(pool.clone()));

    let ttls = config.cache_ttls();
    let policy = Arc::new(AccessPolicy::new(projects.clone(), cache.clone(), ttls.acl));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(click_rx, links.clone()));
    tracing::info!("Click worker started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Sweeper::new(links.clone(), cache.clone(), config.sweep_interval());
    tokio::spawn(sweeper.run(shutdown_rx));
    tracing::info!(
        interval_seconds = config.sweep_interval_seconds,
        "Expiry sweeper started"
    );

    let state = AppState {
        resolution: Arc::new(ResolutionEngine::new(
            links.clone(),
            cache.clone(),
            policy.clone(),
            click_tx,
            ttls,
        )),
        link_service: Arc::new(LinkService::new(
            links,
            projects.clone(),
            cache.clone(),
            policy.clone(),
            ttls,
        )),
        project_service: Arc::new(ProjectService::new(projects, policy)),
        cache,
        cache_enabled,
        base_url: config.base_url.clone(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
