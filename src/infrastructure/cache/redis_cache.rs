//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "link:";

/// Stored in place of a URL by invalidation. Never a valid destination.
const TOMBSTONE: &str = "";

/// Redis cache for short code lookups.
///
/// Reads and writes are fail-open: a Redis error is logged and treated as a
/// miss, so redirects fall back to the database. Invalidation errors are
/// returned to the caller.
///
/// Fills use `SET NX EX`; invalidation overwrites with a tombstone that lives
/// for `tombstone_ttl` seconds. That must exceed the longest time a request can
/// spend between its database read and its fill.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
    tombstone_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_url`] gets no TTL.
    /// `tombstone_ttl_seconds` is how long an invalidated code refuses fills.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid or Redis is unreachable.
    pub async fn connect(
        redis_url: &str,
        default_ttl_seconds: u64,
        tombstone_ttl_seconds: u64,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        let mut probe = conn.clone();
        probe
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {e}")))?;

        info!("Connected to Redis");

        Ok(Self {
            conn,
            default_ttl: default_ttl_seconds,
            tombstone_ttl: tombstone_ttl_seconds,
        })
    }
}

fn build_key(short_code: &str) -> String {
    format!("{KEY_PREFIX}{short_code}")
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(build_key(short_code)).await {
            Ok(value) => {
                let hit = value.filter(|url| url != TOMBSTONE);
                debug!(short_code, hit = hit.is_some(), "Cache lookup");
                Ok(hit)
            }
            Err(e) => {
                warn!(short_code, error = %e, "Redis GET failed");
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        let stored = redis::cmd("SET")
            .arg(build_key(short_code))
            .arg(url)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async::<Option<String>>(&mut conn)
            .await;

        match stored {
            Ok(Some(_)) => {}
            Ok(None) => debug!(short_code, "Cache fill skipped, entry or tombstone present"),
            Err(e) => warn!(short_code, error = %e, "Redis SET failed"),
        }
        Ok(())
    }

    async fn invalidate(&self, short_codes: &[&str]) -> CacheResult<()> {
        if short_codes.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for code in short_codes {
            pipe.set_ex(build_key(code), TOMBSTONE, self.tombstone_ttl).ignore();
        }

        let mut conn = self.conn.clone();
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Operation(format!("Redis SET tombstone failed: {e}")))?;

        debug!(?short_codes, "Cache invalidated");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
