//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, cache setup, and the Axum server
//! lifecycle.

use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration until a shutdown signal.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Pending migrations
/// - Redis cache (or NullCache fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if the database is unreachable, a migration fails, the
/// listen address cannot be bound, or the server stops with an I/O error.
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let cache = connect_cache(&config).await;

    let pool = Arc::new(pool);
    let state = AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgTokenRepository::new(pool)),
        cache,
        config.base_url.clone(),
        config.token_signing_secret.clone(),
    );

    let app = app_router(state, config.behind_proxy, config.request_timeout());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Builds the connection pool from the `DB_*` pool settings.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Redis when configured and reachable; otherwise caching is disabled.
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(
        redis_url,
        config.cache_ttl_seconds,
        config.cache_tombstone_ttl_seconds(),
    )
    .await
    {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
