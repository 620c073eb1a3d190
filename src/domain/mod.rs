//! Domain layer: entities and repository contracts.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependency on infrastructure or HTTP concerns.
//! Business rules live in [`crate::application::services`].

pub mod entities;
pub mod repositories;
