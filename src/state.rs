//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the tool dispatcher and the lead store it was built from; both are
//! `Arc`-backed adapters with no per-request state, so concurrent requests
//! never coordinate with each other.

use std::sync::Arc;
use std::time::Instant;

use crate::store::LeadStore;
use crate::tools::Dispatcher;
use crate::webhook::MessageRelay;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn LeadStore>,
    pub started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn LeadStore>, relay: Arc<dyn MessageRelay>) -> Self {
        Self { dispatcher: Dispatcher::new(store.clone(), relay), store, started_at: Instant::now() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::store::{Lead, NewLead, StoreError};
    use crate::webhook::{OutboundMessage, WebhookError};

    /// In-memory `LeadStore` that enforces `keyword` uniqueness like the
    /// real table and counts every call.
    #[derive(Default)]
    pub struct MemoryStore {
        leads: Mutex<Vec<Lead>>,
        calls: AtomicUsize,
        fail_with: Mutex<Option<String>>,
    }

    impl MemoryStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every following call fail with `StoreError::Request`.
        pub fn fail_with(&self, message: &str) {
            *self.fail_with.lock().expect("store mutex should lock") = Some(message.to_string());
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn leads(&self) -> Vec<Lead> {
            self.leads.lock().expect("store mutex should lock").clone()
        }

        /// Insert directly, bypassing the call counter.
        pub fn seed(&self, keyword: &str, reply: &str) -> Lead {
            let lead = dummy_lead(keyword, reply);
            self.leads
                .lock()
                .expect("store mutex should lock")
                .push(lead.clone());
            lead
        }

        fn begin(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with.lock().expect("store mutex should lock").clone() {
                Some(message) => Err(StoreError::Request(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LeadStore for MemoryStore {
        async fn list_leads(&self) -> Result<Vec<Lead>, StoreError> {
            self.begin()?;
            Ok(self.leads())
        }

        async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, StoreError> {
            self.begin()?;
            Ok(self.leads().into_iter().find(|lead| lead.id == id))
        }

        async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
            self.begin()?;
            // Yield so concurrent inserts interleave at the await point.
            tokio::task::yield_now().await;
            let mut leads = self.leads.lock().expect("store mutex should lock");
            if leads.iter().any(|existing| existing.keyword == lead.keyword) {
                return Err(StoreError::Conflict(format!(
                    "duplicate key value violates unique constraint \"auto_replies_keyword_key\" ({})",
                    lead.keyword
                )));
            }
            let stored = dummy_lead(&lead.keyword, &lead.reply);
            leads.push(stored.clone());
            Ok(stored)
        }
    }

    /// `MessageRelay` that records every message and answers with a canned result.
    pub struct RecordingRelay {
        sent: Mutex<Vec<OutboundMessage>>,
        reply: Result<Value, fn() -> WebhookError>,
    }

    impl RecordingRelay {
        #[must_use]
        pub fn replying(body: Value) -> Self {
            Self { sent: Mutex::new(Vec::new()), reply: Ok(body) }
        }

        #[must_use]
        pub fn failing(make_err: fn() -> WebhookError) -> Self {
            Self { sent: Mutex::new(Vec::new()), reply: Err(make_err) }
        }

        pub fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.lock().expect("relay mutex should lock").clone()
        }
    }

    impl Default for RecordingRelay {
        fn default() -> Self {
            Self::replying(serde_json::json!({ "ok": true }))
        }
    }

    #[async_trait::async_trait]
    impl MessageRelay for RecordingRelay {
        async fn send(&self, msg: &OutboundMessage) -> Result<Value, WebhookError> {
            self.sent
                .lock()
                .expect("relay mutex should lock")
                .push(msg.clone());
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(make_err) => Err(make_err()),
            }
        }
    }

    /// Create a lead with a fresh id and the current timestamp.
    #[must_use]
    pub fn dummy_lead(keyword: &str, reply: &str) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            keyword: keyword.into(),
            reply: reply.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Serve `router` on an ephemeral localhost port and return its base URL.
    pub async fn spawn_server(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("test listener should bind");
        let addr = listener.local_addr().expect("test listener should have an address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server failed");
        });
        format!("http://{addr}")
    }

    /// A localhost URL that refuses connections.
    pub async fn closed_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("test listener should bind");
        let addr = listener.local_addr().expect("test listener should have an address");
        drop(listener);
        format!("http://{addr}")
    }

    /// Create a test `AppState` around the given doubles.
    #[must_use]
    pub fn test_app_state(store: Arc<MemoryStore>, relay: Arc<RecordingRelay>) -> AppState {
        AppState::new(store, relay)
    }
}
