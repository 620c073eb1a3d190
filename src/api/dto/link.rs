//! DTOs for the link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Request body for `POST /api/links` and `PUT /api/links/{id}`.
///
/// Missing fields deserialize as empty strings and are reported by validation
/// alongside any other field errors.
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub short_code: String,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            url: link.url,
            short_url,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Owner listing, most recently updated first.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkResponse>,
}
