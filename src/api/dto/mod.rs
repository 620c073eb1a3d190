//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs only deserialize; validation runs in the link service so the
//! HTTP API and the admin CLI share one rule set.

pub mod health;
pub mod link;
