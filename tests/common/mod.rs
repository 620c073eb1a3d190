#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use link_registry::application::services::auth_service::hash_with_secret;
use link_registry::domain::entities::{Link, LinkChanges, NewLink, UpdatedLink};
use link_registry::domain::repositories::{ApiToken, LinkRepository, TokenRepository};
use link_registry::error::AppError;
use link_registry::infrastructure::cache::{CacheError, CacheResult, CacheService, NullCache};
use link_registry::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use link_registry::routes::service_router;
use link_registry::state::AppState;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://s.example.com";

type ReadHook = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Link store with the same observable contract as the Postgres repository:
/// code uniqueness is checked under the lock, and update/delete filter by owner.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    rows: Mutex<BTreeMap<i64, Link>>,
    next_id: AtomicI64,
    broken: AtomicBool,
    calls: AtomicI64,
    after_read: Mutex<Option<ReadHook>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with an internal error.
    pub fn break_storage(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Number of repository calls made so far.
    pub fn calls(&self) -> i64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows_with_code(&self, short_code: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.short_code == short_code)
            .count()
    }

    pub fn snapshot(&self, id: i64) -> Option<Link> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    /// Runs `hook` once, after the next `find_by_id` or `find_by_code` has read
    /// its row and before it returns. Lets a test commit another mutation in
    /// between a caller's read and its next step.
    pub fn after_next_read<F, Fut>(&self, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        *self.after_read.lock().unwrap() = Some(Box::new(move || Box::pin(hook())));
    }

    async fn run_after_read(&self) {
        let hook = self.after_read.lock().unwrap().take();
        if let Some(hook) = hook {
            hook().await;
        }
    }

    fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                json!({ "reason": "connection refused" }),
            ));
        }
        Ok(())
    }
}

fn unique_violation() -> AppError {
    AppError::conflict(
        "This short code is already taken. Please choose another one.",
        json!({ "field": "short_code" }),
    )
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();

        if rows.values().any(|l| l.short_code == new_link.short_code) {
            return Err(unique_violation());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let link = Link::new(
            id,
            new_link.owner_id,
            new_link.short_code,
            new_link.url,
            now,
            now,
        );
        rows.insert(id, link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        self.enter()?;
        let found = self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|l| l.is_owned_by(owner_id))
            .cloned();
        self.run_after_read().await;
        Ok(found)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        self.enter()?;
        let found = self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|l| l.short_code == short_code)
            .cloned();
        self.run_after_read().await;
        Ok(found)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        self.enter()?;
        let mut links: Vec<Link> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.is_owned_by(owner_id))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        changes: LinkChanges,
    ) -> Result<Option<UpdatedLink>, AppError> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();

        if rows
            .values()
            .any(|l| l.id != id && l.short_code == changes.short_code)
        {
            return Err(unique_violation());
        }

        let Some(link) = rows.get_mut(&id).filter(|l| l.is_owned_by(owner_id)) else {
            return Ok(None);
        };

        let previous_short_code = std::mem::replace(&mut link.short_code, changes.short_code);
        link.url = changes.url;
        link.updated_at = Utc::now();
        Ok(Some(UpdatedLink {
            link: link.clone(),
            previous_short_code,
        }))
    }

    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();

        if rows.get(&id).is_some_and(|l| l.is_owned_by(owner_id)) {
            return Ok(rows.remove(&id));
        }
        Ok(None)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.enter()
    }
}

/// Token store keyed by hash.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<Vec<ApiToken>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `raw_token` for `owner_id`, hashed the way the server hashes it.
    pub fn issue(&self, owner_id: &str, raw_token: &str) {
        let mut tokens = self.tokens.lock().unwrap();
        let id = tokens.len() as i64 + 1;
        tokens.push(ApiToken {
            id,
            name: format!("{owner_id}-{id}"),
            owner_id: owner_id.to_string(),
            token_hash: hash_with_secret(TEST_SECRET, raw_token),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
    }

    pub fn revoke_all(&self) {
        for token in self.tokens.lock().unwrap().iter_mut() {
            token.revoked_at = Some(Utc::now());
        }
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
            .map(|t| t.owner_id.clone()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        if let Some(token) = self
            .tokens
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.token_hash == token_hash)
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        owner_id: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        match self
            .tokens
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.id == id && !t.is_revoked())
        {
            Some(token) => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found("Token not found", json!({ "id": id }))),
        }
    }
}

/// Redirect cache backed by a map, with a switch to fail invalidations.
///
/// Follows the tombstone contract of the Redis cache. Tombstones stay until
/// [`InMemoryCache::expire_tombstones`] is called.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Option<String>>>,
    failing: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached URL for `short_code`; `None` for a miss or a tombstone.
    pub fn get(&self, short_code: &str) -> Option<String> {
        self.entries.lock().unwrap().get(short_code).cloned().flatten()
    }

    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Drops every tombstone, as if their TTL had run out.
    pub fn expire_tombstones(&self) {
        self.entries.lock().unwrap().retain(|_, url| url.is_some());
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.get(short_code))
    }

    async fn set_url(
        &self,
        short_code: &str,
        url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .entry(short_code.to_string())
            .or_insert_with(|| Some(url.to_string()));
        Ok(())
    }

    async fn invalidate(&self, short_codes: &[&str]) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Operation("SET tombstone failed".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        for code in short_codes {
            entries.insert(code.to_string(), None);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// In-process application over in-memory storage.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub cache: Arc<InMemoryCache>,
}

impl TestApp {
    pub fn new() -> Self {
        let links = Arc::new(InMemoryLinkRepository::new());
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let cache = Arc::new(InMemoryCache::new());

        let state = AppState::new(
            links.clone(),
            tokens.clone(),
            cache.clone(),
            BASE_URL,
            TEST_SECRET.to_string(),
        );

        Self {
            state,
            links,
            tokens,
            cache,
        }
    }

    /// Issues a bearer token for `owner_id` and returns it.
    pub fn token_for(&self, owner_id: &str) -> String {
        let raw = format!("token-{owner_id}");
        self.tokens.issue(owner_id, &raw);
        raw
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(service_router(self.state.clone())).unwrap()
    }
}

/// State over the Postgres repositories, for `#[sqlx::test]` handler tests.
pub fn create_pg_state(pool: PgPool) -> AppState {
    let pool = Arc::new(pool);

    AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgTokenRepository::new(pool)),
        Arc::new(NullCache::new()),
        BASE_URL,
        TEST_SECRET.to_string(),
    )
}

pub async fn insert_link(pool: &PgPool, owner_id: &str, short_code: &str, url: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO links (owner_id, short_code, url) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner_id)
    .bind(short_code)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_token(pool: &PgPool, owner_id: &str, raw_token: &str) {
    sqlx::query("INSERT INTO api_tokens (name, owner_id, token_hash) VALUES ($1, $2, $3)")
        .bind(format!("{owner_id}-{raw_token}"))
        .bind(owner_id)
        .bind(hash_with_secret(TEST_SECRET, raw_token))
        .execute(pool)
        .await
        .unwrap();
}
