//! Lead store, the datastore seam behind `view_leads`, `setup_auto_reply`
//! and `GET /lead/{id}`.
//!
//! DESIGN
//! ======
//! The dispatcher only sees the `LeadStore` trait. Two adapters exist: a
//! PostgREST client for the hosted Supabase project and a direct `sqlx`
//! pool for plain Postgres. Neither caches; every call is a round trip.
//!
//! ERROR HANDLING
//! ==============
//! A `keyword` uniqueness violation is reported as `StoreError::Conflict` by
//! both adapters so callers never need to know which backend is live.

pub mod postgres;
pub mod supabase;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ErrorCode;

/// Postgres error code for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Table holding auto-reply rules. The REST adapter builds its URL from this;
/// the Postgres queries and the migration spell the name out literally.
pub const LEADS_TABLE: &str = "auto_replies";

// =============================================================================
// TYPES
// =============================================================================

/// A stored auto-reply rule. Mirrors the `auto_replies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub keyword: String,
    pub reply: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload. `id` and `created_at` are assigned by the datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub keyword: String,
    pub reply: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("keyword already exists: {0}")]
    Conflict(String),
    #[error("datastore request failed: {0}")]
    Request(String),
    #[error("datastore returned status {status}: {message}")]
    Response { status: u16, message: String },
    #[error("datastore response parse failed: {0}")]
    Parse(String),
    #[error("datastore request timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "E_STORE_CONFLICT",
            Self::Request(_) => "E_STORE_REQUEST",
            Self::Response { .. } => "E_STORE_RESPONSE",
            Self::Parse(_) => "E_STORE_PARSE",
            Self::Timeout => "E_STORE_TIMEOUT",
            Self::Database(_) => "E_DATABASE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout | Self::Response { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Backend-neutral access to lead records. Enables test doubles.
#[async_trait::async_trait]
pub trait LeadStore: Send + Sync {
    /// Return every lead in datastore order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the datastore call fails or times out.
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError>;

    /// Fetch one lead. `Ok(None)` when no row has this id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the datastore call fails or times out.
    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, StoreError>;

    /// Insert a lead and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when `keyword` already exists, or
    /// another [`StoreError`] if the datastore call fails.
    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
