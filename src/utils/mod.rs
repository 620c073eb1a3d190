//! Utility functions shared across layers.
//!
//! - [`short_code`] - Short code and destination URL validation rules
//! - [`db_error`] - Database error classification

pub mod db_error;
pub mod short_code;
