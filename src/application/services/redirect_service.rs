//! Redirect resolution: short code → destination URL.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::LinkService;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::short_code::is_well_formed;

/// Read-only resolver for the public redirect path.
///
/// Reads through the cache and falls back to [`LinkService::resolve_code`].
/// Cache errors never fail a redirect.
pub struct RedirectService {
    links: Arc<LinkService>,
    cache: Arc<dyn CacheService>,
}

impl RedirectService {
    pub fn new(links: Arc<LinkService>, cache: Arc<dyn CacheService>) -> Self {
        Self { links, cache }
    }

    /// Returns the stored destination URL for `short_code`, unmodified.
    ///
    /// Codes that cannot exist are answered without a storage lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Internal`] on storage failures.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if !is_well_formed(short_code) {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "short_code": short_code }),
            ));
        }

        match self.cache.get_url(short_code).await {
            Ok(Some(url)) => {
                debug!(short_code, "Cache HIT");
                return Ok(url);
            }
            Ok(None) => debug!(short_code, "Cache MISS"),
            Err(e) => warn!(short_code, error = %e, "Cache read failed, using database"),
        }

        let link = self.links.resolve_code(short_code).await?;

        if let Err(e) = self.cache.set_url(short_code, &link.url, None).await {
            warn!(short_code, error = %e, "Failed to cache redirect");
        }

        Ok(link.url)
    }
}
