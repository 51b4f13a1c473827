//! Polling API Fee Source
//!
//! Pulls accumulated creator fees from a platform HTTP endpoint using a
//! cursor. Fetched events stay buffered until the engine acknowledges them,
//! so an epoch failure retries the same events next cycle even though the
//! cursor has already advanced server-side.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::domain::fee::FeeEvent;
use crate::ports::fee_source::{FeeSource, FeeSourceError};

#[derive(Debug, Deserialize)]
struct ApiFeeResponse {
    fees: Vec<ApiFee>,
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFee {
    amount: String,
    mint: String,
    timestamp: u64,
    signature: Option<String>,
}

#[derive(Debug, Default)]
struct ApiState {
    initialized: bool,
    cursor: Option<String>,
    pending: Vec<FeeEvent>,
}

/// Cursor-based fee poller
pub struct ApiFeeSource {
    api_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
    state: Mutex<ApiState>,
}

impl ApiFeeSource {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            api_url,
            api_key,
            http: reqwest::Client::new(),
            state: Mutex::new(ApiState::default()),
        }
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<ApiFeeResponse, FeeSourceError> {
        let mut request = self.http.get(&self.api_url);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FeeSourceError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeeSourceError::Api(format!(
                "fee API returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FeeSourceError::Api(e.to_string()))
    }
}

/// Convert an API page into fee events; a malformed amount fails the page
fn parse_fees(fees: Vec<ApiFee>) -> Result<Vec<FeeEvent>, FeeSourceError> {
    fees.into_iter()
        .map(|fee| {
            let amount = fee
                .amount
                .parse::<u64>()
                .map_err(|_| FeeSourceError::Malformed(format!("bad amount {:?}", fee.amount)))?;
            Ok(FeeEvent {
                amount,
                mint: fee.mint,
                timestamp: fee.timestamp,
                signature: fee.signature,
                metadata: None,
            })
        })
        .collect()
}

#[async_trait]
impl FeeSource for ApiFeeSource {
    async fn initialize(&self) -> Result<(), FeeSourceError> {
        tracing::info!(api_url = %self.api_url, "ApiFeeSource initialized");
        self.state.lock().await.initialized = true;
        Ok(())
    }

    async fn available_fees(&self) -> Result<Vec<FeeEvent>, FeeSourceError> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            return Err(FeeSourceError::NotInitialized);
        }

        let page = self.fetch_page(state.cursor.as_deref()).await?;
        let new_events = parse_fees(page.fees)?;
        if !new_events.is_empty() {
            tracing::info!(count = new_events.len(), "fetched fees from API");
            state.pending.extend(new_events);
        }
        if page.cursor.is_some() {
            state.cursor = page.cursor;
        }

        Ok(state.pending.clone())
    }

    async fn acknowledge_fees(&self, fees: &[FeeEvent]) -> Result<(), FeeSourceError> {
        let mut state = self.state.lock().await;
        if !state.initialized {
            return Err(FeeSourceError::NotInitialized);
        }

        state.pending.retain(|pending| !fees.contains(pending));
        tracing::info!(count = fees.len(), "acknowledged fees (cursor committed)");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), FeeSourceError> {
        tracing::info!("ApiFeeSource shutdown");
        let mut state = self.state.lock().await;
        state.initialized = false;
        state.pending.clear();
        Ok(())
    }
}
