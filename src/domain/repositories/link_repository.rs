//! Repository trait for link storage.

use crate::domain::entities::{Link, LinkChanges, NewLink, UpdatedLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage contract for links.
///
/// Implementations must enforce short-code uniqueness themselves (a unique
/// constraint or an equivalent serialization point) and must apply the owner
/// filter inside the mutating operation, not as a separate read.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken, even when
    /// a concurrent writer claimed it after the caller's pre-check.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by id, visible only to its owner.
    ///
    /// Returns `Ok(None)` both when the link is missing and when it belongs to
    /// someone else.
    async fn find_by_id(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its short code regardless of owner.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links, most recently updated first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError>;

    /// Replaces the mutable fields of a link owned by `owner_id`.
    ///
    /// Returns the updated link with the short code it had at the moment of the
    /// write, or `Ok(None)` if no link matches both `id` and `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the new short code belongs to another link.
    async fn update(
        &self,
        id: i64,
        owner_id: &str,
        changes: LinkChanges,
    ) -> Result<Option<UpdatedLink>, AppError>;

    /// Permanently deletes a link owned by `owner_id`.
    ///
    /// Returns the removed link, or `Ok(None)` if nothing matched.
    async fn delete(&self, id: i64, owner_id: &str) -> Result<Option<Link>, AppError>;

    /// Checks that the backing store answers queries.
    async fn ping(&self) -> Result<(), AppError>;
}
