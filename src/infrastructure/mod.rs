//! Infrastructure layer: concrete implementations of domain contracts.
//!
//! - [`cache`] - Redis and no-op caches for the redirect path
//! - [`persistence`] - PostgreSQL repositories

pub mod cache;
pub mod persistence;
