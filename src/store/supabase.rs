//! Supabase (PostgREST) lead store.
//!
//! Thin HTTP wrapper over `/rest/v1/auto_replies`. Pure parsing lives in
//! `parse_rows` and `parse_error` for testability.

use reqwest::Method;
use uuid::Uuid;

use super::{LEADS_TABLE, Lead, LeadStore, NewLead, StoreError, UNIQUE_VIOLATION};
use crate::config::UpstreamTimeouts;

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseStore {
    http: reqwest::Client,
    table_url: String,
    api_key: String,
}

impl SupabaseStore {
    /// Build a store for the project at `base_url` (e.g. `https://abc.supabase.co`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: String, timeouts: UpstreamTimeouts) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        let table_url = format!("{}/rest/v1/{LEADS_TABLE}", base_url.trim_end_matches('/'));
        Ok(Self { http, table_url, api_key })
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        self.http
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait::async_trait]
impl LeadStore for SupabaseStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError> {
        let body = send(self.request(Method::GET).query(&[("select", "*")])).await?;
        parse_rows(&body)
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, StoreError> {
        let filter = format!("eq.{id}");
        let body = send(
            self.request(Method::GET)
                .query(&[("select", "*"), ("id", filter.as_str())]),
        )
        .await?;
        Ok(parse_rows(&body)?.into_iter().next())
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let body = send(
            self.request(Method::POST)
                .header("Prefer", "return=representation")
                .json(&[lead]),
        )
        .await?;
        parse_rows(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Parse("insert returned no rows".into()))
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<String, StoreError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(parse_error(status.as_u16(), &text));
    }
    Ok(text)
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() { StoreError::Timeout } else { StoreError::Request(err.to_string()) }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(serde::Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

fn parse_rows(json: &str) -> Result<Vec<Lead>, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))
}

fn parse_error(status: u16, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<PostgrestError>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code.clone());
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string());

    if status == 409 || code.as_deref() == Some(UNIQUE_VIOLATION) {
        StoreError::Conflict(message)
    } else {
        StoreError::Response { status, message }
    }
}

#[cfg(test)]
#[path = "supabase_test.rs"]
mod tests;
