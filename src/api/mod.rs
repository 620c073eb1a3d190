//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication, rate limiting and tracing middleware
//! - [`routes`] - Protected API route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
