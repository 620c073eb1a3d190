//! Core domain entities.
//!
//! - [`Link`] - A persisted short code → destination mapping
//! - [`LinkDraft`] - Validated user input shared by create and update
//! - [`NewLink`], [`LinkChanges`] - Repository write payloads
//! - [`UpdatedLink`] - Update result carrying the replaced code

pub mod link;

pub use link::{Link, LinkChanges, LinkDraft, NewLink, UpdatedLink};
