//! Authentication service: bearer token → owner identity.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Resolves API tokens to the owner they act for.
///
/// Tokens are hashed with HMAC-SHA256 keyed by `signing_secret` before lookup;
/// a database dump alone cannot be used to forge or verify tokens.
pub struct AuthService {
    repository: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were issued.
    pub fn new(repository: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Hashes a raw token into the 64-character hex form stored in the database.
    pub fn hash_token(&self, token: &str) -> String {
        hash_with_secret(&self.signing_secret, token)
    }

    /// Authenticates a raw token and returns its owner id.
    ///
    /// Updates `last_used_at` on success; a failure to record usage is logged
    /// and does not fail the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown or revoked tokens.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<String, AppError> {
        let token_hash = self.hash_token(token);

        let owner_id = self
            .repository
            .find_owner(&token_hash)
            .await?
            .filter(|owner| !owner.is_empty())
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Invalid or revoked token" }),
                )
            })?;

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(error = %e, "Failed to record token usage");
        }

        Ok(owner_id)
    }
}

/// HMAC-SHA256 of `token` under `secret`, hex encoded.
pub fn hash_with_secret(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
