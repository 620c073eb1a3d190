//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    update_link_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{Router, middleware, routing::get};

/// Link management routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`        - Create a link
/// - `GET    /links`        - List the owner's links
/// - `GET    /links/{id}`   - Fetch one link
/// - `PUT    /links/{id}`   - Replace url and code
/// - `DELETE /links/{id}`   - Delete a link
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
