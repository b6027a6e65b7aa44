use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::rbac::Role;

// --- Core Schemas ---

/// PageStatus
///
/// The two lifecycle states of a page. A draft is only visible to editors and above;
/// a published page is visible to everyone, including anonymous callers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown page status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for PageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for PageStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Page
///
/// A CMS page record, as stored in the page collection (the `pages` table in Postgres).
///
/// `status` and `created_by` are stored as TEXT and decoded through their `TryFrom<String>`
/// impls, so an unexpected value in the database surfaces as a decode error rather than a
/// silently defaulted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page {
    pub id: Uuid,
    // Human-chosen lookup key. Not unique; lookups take the first match.
    pub slug: String,
    pub title: String,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: PageStatus,
    // Role of the creator, fixed at creation.
    #[sqlx(try_from = "String")]
    pub created_by: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// new_draft
    ///
    /// Builds a fresh draft with a new id. `created_at` and `updated_at` share the same
    /// instant so the `created_at <= updated_at` invariant holds from the start.
    pub fn new_draft(created_by: Role, req: CreatePageRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: req.slug,
            title: req.title,
            content: req.content,
            status: PageStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }
}

// --- Request Payloads (Input Schemas) ---

/// CreatePageRequest
///
/// Input payload for creating a draft (POST /pages).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePageRequest {
    #[schema(example = "About us")]
    pub title: String,
    pub content: String,
    #[schema(example = "about-us")]
    pub slug: String,
}

/// UpdatePageRequest
///
/// Partial update payload (PUT /pages/{id}). Omitted fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// --- Response Schemas (Output) ---

/// ApiResponse
///
/// The envelope every endpoint answers with. `status` repeats the HTTP status code so
/// callers that only see the body (e.g. a non-HTTP binding) still get it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn success(status: u16, data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            status,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            status,
        }
    }
}

/// RoleInfo
///
/// One entry of the role catalog (GET /roles).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoleInfo {
    pub role: Role,
    pub rank: u8,
}

/// ActorProfile
///
/// The identity resolved for the current request (GET /me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActorProfile {
    pub role: Role,
}

/// PageStats
///
/// Output schema for the administrative overview (GET /admin/stats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PageStats {
    pub total: usize,
    pub drafts: usize,
    pub published: usize,
}
