//! No-op cache used when Redis is not configured.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing; every lookup is a miss.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_codes: &[&str]) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();

        cache.set_url("demo", "https://example.com", None).await.unwrap();

        assert_eq!(cache.get_url("demo").await.unwrap(), None);
        assert!(cache.invalidate(&["demo"]).await.is_ok());
        assert!(cache.health_check().await);
    }
}
