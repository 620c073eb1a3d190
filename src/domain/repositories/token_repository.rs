//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token issued to an owner.
///
/// Only the HMAC of the raw token is stored.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to the owner it acts for.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(owner_id))` if the token exists and is not revoked
    /// - `Ok(None)` otherwise
    async fn find_owner(&self, token_hash: &str) -> Result<Option<String>, AppError>;

    /// Updates the `last_used_at` timestamp for a token.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Stores a new token for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or hash is already in use.
    async fn create_token(
        &self,
        name: &str,
        owner_id: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError>;

    /// Lists all tokens in the system.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Finds a token by its database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError>;

    /// Finds a token by its name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the token does not exist or is already revoked.
    async fn revoke_token(&self, id: i64) -> Result<(), AppError>;
}
