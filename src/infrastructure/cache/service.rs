//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of short code → destination URL.
///
/// The redirect resolver fills it; the link registry invalidates entries
/// before an update or delete returns. Implementations must be thread-safe.
///
/// Invalidation leaves a short-lived tombstone instead of deleting the entry,
/// and a fill never overwrites an existing entry or tombstone. A resolve that
/// read the database before a mutation therefore cannot put the old URL back
/// after the mutation invalidated it.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached destination for `short_code`, if any.
    ///
    /// A tombstoned code is a miss.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Caches a destination unless the code already has an entry or a
    /// tombstone. `ttl_seconds = None` uses the implementation default.
    async fn set_url(
        &self,
        short_code: &str,
        url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Replaces the entries for every code in `short_codes` with tombstones.
    async fn invalidate(&self, short_codes: &[&str]) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name for health reports.
    fn backend(&self) -> &'static str;
}
