//! PostgreSQL repository implementations.
//!
//! - [`PgLinkRepository`] - Link storage with the short-code unique constraint
//! - [`PgTokenRepository`] - API token storage and owner lookup

pub mod pg_link_repository;
pub mod pg_token_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
