//! Application layer services.
//!
//! Services consume repository traits and hold the rules that HTTP handlers
//! and the admin CLI share.
//!
//! - [`services::link_service::LinkService`] - Owner-scoped link registry
//! - [`services::redirect_service::RedirectService`] - Public code resolution through the cache
//! - [`services::auth_service::AuthService`] - API token to owner resolution

pub mod services;
