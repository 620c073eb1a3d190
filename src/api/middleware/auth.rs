//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Owner identity established by [`layer`] for the current request.
///
/// Handlers take it as an extractor; outside an authenticated route it rejects
/// with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentOwner(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentOwner>().cloned().ok_or_else(|| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "No authenticated owner" }))
        })
    }
}

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Resolve the token hash to its owner
/// 3. Attach [`CurrentOwner`] to the request
/// 4. Continue to next middleware/handler
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is
/// missing or malformed, or the token is unknown or revoked. The handler is
/// never invoked in that case.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Authorization header is missing or invalid" }),
            )
        })?;

    let owner_id = st.auth_service.authenticate(&token).await?;
    parts.extensions.insert(CurrentOwner(owner_id));

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}
