//! Link entity representing an owner's short code → destination mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::utils::short_code::{SHORT_CODE_REGEX, validate_absolute_url, validate_not_reserved};

/// A persisted short link.
///
/// `short_code` is unique across all owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: i64,
    pub owner_id: String,
    pub short_code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        owner_id: String,
        short_code: String,
        url: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            short_code,
            url,
            created_at,
            updated_at,
        }
    }

    /// Returns true if `owner_id` created this link.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// User-supplied link fields, validated before any storage access.
///
/// Shared by create and update; field names double as the keys of the
/// per-field error map.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct LinkDraft {
    #[validate(custom(function = "validate_absolute_url"))]
    pub url: String,

    #[validate(
        length(
            min = 3,
            max = 20,
            message = "Short code must be between 3 and 20 characters"
        ),
        regex(
            path = *SHORT_CODE_REGEX,
            message = "Short code can only contain letters, numbers, hyphens, and underscores"
        ),
        custom(function = "validate_not_reserved")
    )]
    pub short_code: String,
}

impl LinkDraft {
    pub fn new(url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            short_code: short_code.into(),
        }
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub owner_id: String,
    pub short_code: String,
    pub url: String,
}

/// Replacement values for an existing link's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChanges {
    pub short_code: String,
    pub url: String,
}

/// Result of an update: the new row and the code it held just before the write.
///
/// `previous_short_code` comes from the same locked row as the write, so it
/// reflects any rename that committed after the caller last read the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedLink {
    pub link: Link,
    pub previous_short_code: String,
}
