//! The link registry: validated, owner-scoped CRUD over short links.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::entities::{Link, LinkChanges, LinkDraft, NewLink, UpdatedLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Single writer of the link store.
///
/// Every mutation validates its input before touching storage, relies on the
/// repository's unique constraint for short-code uniqueness, and invalidates
/// cached redirects for the affected codes before returning.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin used to render short URLs.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Creates a link for `owner_id`.
    ///
    /// The existence pre-check only produces a friendlier error early; two
    /// concurrent creates can both pass it, and the storage constraint then
    /// rejects the loser with the same [`AppError::Conflict`].
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] if `owner_id` is empty
    /// - [`AppError::Validation`] with per-field messages for a bad URL or code
    /// - [`AppError::Conflict`] if the code is taken
    /// - [`AppError::Internal`] on storage failures
    pub async fn create_link(
        &self,
        owner_id: &str,
        url: String,
        short_code: String,
    ) -> Result<Link, AppError> {
        require_owner(owner_id)?;
        let draft = LinkDraft::new(url, short_code);
        draft.validate()?;

        if self
            .repository
            .find_by_code(&draft.short_code)
            .await?
            .is_some()
        {
            return Err(code_taken(&draft.short_code));
        }

        let link = self
            .repository
            .create(NewLink {
                owner_id: owner_id.to_string(),
                short_code: draft.short_code,
                url: draft.url,
            })
            .await?;

        metrics::counter!("link_mutations_total", "op" => "create").increment(1);
        info!(link_id = link.id, short_code = %link.short_code, "Link created");
        Ok(link)
    }

    /// Replaces the destination and code of a link owned by `owner_id`.
    ///
    /// A link that is missing and a link owned by someone else produce the same
    /// [`AppError::NotFound`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_link`], plus [`AppError::NotFound`].
    pub async fn update_link(
        &self,
        link_id: i64,
        owner_id: &str,
        url: String,
        short_code: String,
    ) -> Result<Link, AppError> {
        require_owner(owner_id)?;
        let draft = LinkDraft::new(url, short_code);
        draft.validate()?;

        let existing = self.get_link(link_id, owner_id).await?;

        if existing.short_code != draft.short_code
            && let Some(holder) = self.repository.find_by_code(&draft.short_code).await?
            && holder.id != existing.id
        {
            return Err(code_taken(&draft.short_code));
        }

        let UpdatedLink {
            link: updated,
            previous_short_code,
        } = self
            .repository
            .update(
                link_id,
                owner_id,
                LinkChanges {
                    short_code: draft.short_code,
                    url: draft.url,
                },
            )
            .await?
            .ok_or_else(|| link_not_found(link_id))?;

        // `existing` may be stale by now; the repository reports the code the
        // write really replaced.
        self.invalidate(&[
            previous_short_code.as_str(),
            updated.short_code.as_str(),
        ])
        .await?;

        metrics::counter!("link_mutations_total", "op" => "update").increment(1);
        info!(link_id, short_code = %updated.short_code, "Link updated");
        Ok(updated)
    }

    /// Permanently deletes a link owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link with this id belongs to the owner.
    pub async fn delete_link(&self, link_id: i64, owner_id: &str) -> Result<(), AppError> {
        require_owner(owner_id)?;

        let removed = self
            .repository
            .delete(link_id, owner_id)
            .await?
            .ok_or_else(|| link_not_found(link_id))?;

        self.invalidate(&[removed.short_code.as_str()]).await?;

        metrics::counter!("link_mutations_total", "op" => "delete").increment(1);
        info!(link_id, short_code = %removed.short_code, "Link deleted");
        Ok(())
    }

    /// Fetches a link by id on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is missing or not owned by `owner_id`.
    pub async fn get_link(&self, link_id: i64, owner_id: &str) -> Result<Link, AppError> {
        require_owner(owner_id)?;

        self.repository
            .find_by_id(link_id, owner_id)
            .await?
            .ok_or_else(|| link_not_found(link_id))
    }

    /// Lists the owner's links, most recently updated first.
    pub async fn list_links(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        require_owner(owner_id)?;
        self.repository.list_by_owner(owner_id).await
    }

    /// Looks up a link by code for anyone. No ownership filter applies.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn resolve_code(&self, short_code: &str) -> Result<Link, AppError> {
        self.repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "short_code": short_code })))
    }

    /// Checks that the link store answers queries.
    pub async fn storage_health(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), short_code)
    }

    /// Drops cached redirects after a committed mutation.
    ///
    /// A failure is an internal error even though the mutation itself committed.
    async fn invalidate(&self, short_codes: &[&str]) -> Result<(), AppError> {
        let mut codes = short_codes.to_vec();
        codes.dedup();

        self.cache.invalidate(&codes).await.map_err(|e| {
            warn!(error = %e, ?codes, "Failed to invalidate cached redirects");
            AppError::internal("Cache invalidation failed", json!({ "reason": e.to_string() }))
        })
    }
}

fn require_owner(owner_id: &str) -> Result<(), AppError> {
    if owner_id.trim().is_empty() {
        return Err(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "Missing owner identity" }),
        ));
    }
    Ok(())
}

fn code_taken(short_code: &str) -> AppError {
    AppError::conflict(
        "This short code is already taken. Please choose another one.",
        json!({ "field": "short_code", "short_code": short_code }),
    )
}

fn link_not_found(link_id: i64) -> AppError {
    AppError::not_found("Link not found", json!({ "id": link_id }))
}
