//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::domain::repositories::{LinkRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Wires the services over the given storage and cache backends.
    /// The registry and the resolver share one cache.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        tokens: Arc<dyn TokenRepository>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
        signing_secret: String,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(links, cache.clone(), base_url));
        let redirect_service = Arc::new(RedirectService::new(link_service.clone(), cache.clone()));
        let auth_service = Arc::new(AuthService::new(tokens, signing_secret));

        Self {
            link_service,
            redirect_service,
            auth_service,
            cache,
        }
    }
}
