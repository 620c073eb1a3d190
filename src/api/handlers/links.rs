//! Handlers for the owner-scoped link endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::link::{LinkListResponse, LinkRequest, LinkResponse};
use crate::api::middleware::auth::CurrentOwner;
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated owner.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "short_code": "demo" }
/// ```
///
/// # Errors
///
/// - 400 with per-field messages if the URL or code is invalid
/// - 409 if the code is already taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(payload): Json<LinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let link = state
        .link_service
        .create_link(&owner_id, payload.url, payload.short_code)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Lists the authenticated owner's links.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list_links(&owner_id).await?;

    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| to_response(&state, link))
        .collect();

    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Returns one of the owner's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
///
/// # Errors
///
/// Returns 404 if the link does not exist or belongs to another owner.
pub async fn get_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<LinkResponse>, AppError> {
    let link_id = parse_link_id(&id)?;
    let link = state.link_service.get_link(link_id, &owner_id).await?;

    Ok(Json(to_response(&state, link)))
}

/// Replaces the destination and code of a link.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
///
/// Both fields are required. Cached redirects for the old and new codes are
/// dropped before the response is sent.
///
/// # Errors
///
/// - 400 with per-field messages if the URL or code is invalid
/// - 404 if the link does not exist or belongs to another owner
/// - 409 if the new code is taken by another link
pub async fn update_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let link_id = parse_link_id(&id)?;
    let link = state
        .link_service
        .update_link(link_id, &owner_id, payload.url, payload.short_code)
        .await?;

    Ok(Json(to_response(&state, link)))
}

/// Permanently deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Errors
///
/// Returns 404 if the link does not exist or belongs to another owner.
pub async fn delete_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<StatusCode, AppError> {
    let link_id = parse_link_id(&id)?;
    state.link_service.delete_link(link_id, &owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.link_service.short_url(&link.short_code);
    LinkResponse::from_link(link, short_url)
}

/// Ids that are not integers cannot name a link.
fn parse_link_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found("Link not found", json!({ "id": raw })))
}
