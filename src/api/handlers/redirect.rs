//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Responses
///
/// - **307 Temporary Redirect** with `Location` set to the stored URL verbatim
/// - **404 Not Found** with a plain-text body if no link has this code
/// - **500 Internal Server Error** with a generic plain-text body on storage
///   failure; the cause is logged
///
/// Public: no authentication and no rate limiting.
pub async fn redirect_handler(Path(code): Path<String>, State(state): State<AppState>) -> Response {
    match state.redirect_service.resolve(&code).await {
        Ok(url) => match HeaderValue::from_bytes(url.as_bytes()) {
            Ok(location) => {
                metrics::counter!("redirects_total", "outcome" => "found").increment(1);
                (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response()
            }
            Err(e) => {
                error!(short_code = %code, error = %e, "Stored URL is not a valid Location header");
                server_error()
            }
        },
        Err(AppError::NotFound { .. }) => {
            metrics::counter!("redirects_total", "outcome" => "not_found").increment(1);
            (StatusCode::NOT_FOUND, "Link not found").into_response()
        }
        Err(e) => {
            error!(short_code = %code, error = ?e, "Redirect lookup failed");
            server_error()
        }
    }
}

fn server_error() -> Response {
    metrics::counter!("redirects_total", "outcome" => "error").increment(1);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
