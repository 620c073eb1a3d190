//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mocks are generated with `mockall`
//! for unit tests.
//!
//! - [`LinkRepository`] - Link CRUD with storage-enforced code uniqueness
//! - [`TokenRepository`] - API token → owner resolution

pub mod link_repository;
pub mod token_repository;

pub use link_repository::LinkRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
