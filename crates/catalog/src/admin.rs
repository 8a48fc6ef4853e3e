//! Write client for the spreadsheet's Apps Script web app.
//!
//! Every write is a `POST` of `{ "action", "data", "id" }` JSON. The web app
//! answers with `{ "success": bool, "message"?: string }` when it can; a 2xx
//! response without a readable result is reported as
//! [`WriteOutcome::Unconfirmed`] rather than assumed to have succeeded.
//!
//! After any non-error outcome the snapshot store is invalidated so the next
//! load refetches from the spreadsheet.

use devpooja_core::{CatalogItem, ProductId};
use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cache::SnapshotStore;
use crate::config::AppsScriptConfig;

/// Errors that can occur when sending a catalog write.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The web app URL is unset, blank, or a placeholder.
    #[error("Apps Script URL not configured: {0}")]
    NotConfigured(String),

    /// The web app answered with a non-success status.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Connection failure or timeout.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write operation understood by the web app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Add,
    Update,
    Delete,
}

/// Product fields sent for `add` and `update`. The id travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
}

impl From<&CatalogItem> for ProductDraft {
    fn from(item: &CatalogItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            price: item.price,
            quantity: item.quantity,
            description: item.description.clone(),
            features: item.features.clone(),
            image: item.image.clone(),
            featured: item.featured,
        }
    }
}

/// What the web app reported about a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The web app confirmed the write.
    Confirmed,
    /// The web app refused the write.
    Rejected { message: String },
    /// The request was accepted but the result could not be read.
    Unconfirmed,
}

impl WriteOutcome {
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

#[derive(Debug, Serialize)]
struct WritePayload<'a> {
    action: WriteAction,
    data: Option<&'a ProductDraft>,
    id: Option<ProductId>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl WriteResponse {
    fn into_outcome(self) -> WriteOutcome {
        if self.success {
            WriteOutcome::Confirmed
        } else {
            WriteOutcome::Rejected {
                message: self
                    .error
                    .or(self.message)
                    .unwrap_or_else(|| "write rejected".to_string()),
            }
        }
    }
}

/// Classify a 2xx response body.
fn read_outcome(body: &str) -> WriteOutcome {
    serde_json::from_str::<WriteResponse>(body)
        .map_or(WriteOutcome::Unconfirmed, WriteResponse::into_outcome)
}

/// Client for catalog writes.
#[derive(Clone)]
pub struct CatalogWriter<S> {
    client: reqwest::Client,
    endpoint: String,
    store: S,
}

impl<S: SnapshotStore> CatalogWriter<S> {
    /// Create a writer that invalidates `store` after each write.
    ///
    /// # Errors
    ///
    /// Returns `WriteError::NotConfigured` if the URL is unset or a placeholder, or
    /// `WriteError::Transport` if the HTTP client fails to build.
    pub fn new(config: &AppsScriptConfig, store: S) -> Result<Self, WriteError> {
        let endpoint = config
            .endpoint()
            .map_err(WriteError::NotConfigured)?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            store,
        })
    }

    /// Append a new product row.
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the request fails or is refused with a
    /// non-success status.
    pub async fn add(&self, draft: &ProductDraft) -> Result<WriteOutcome, WriteError> {
        self.send(WritePayload {
            action: WriteAction::Add,
            data: Some(draft),
            id: None,
        })
        .await
    }

    /// Replace the row of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the request fails or is refused with a
    /// non-success status.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<WriteOutcome, WriteError> {
        self.send(WritePayload {
            action: WriteAction::Update,
            data: Some(draft),
            id: Some(id),
        })
        .await
    }

    /// Delete a product row.
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the request fails or is refused with a
    /// non-success status.
    pub async fn delete(&self, id: ProductId) -> Result<WriteOutcome, WriteError> {
        self.send(WritePayload {
            action: WriteAction::Delete,
            data: None,
            id: Some(id),
        })
        .await
    }

    #[instrument(skip(self, payload), fields(action = ?payload.action, id = ?payload.id))]
    async fn send(&self, payload: WritePayload<'_>) -> Result<WriteOutcome, WriteError> {
        let body = serde_json::to_vec(&payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WriteError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let outcome = match response.text().await {
            Ok(body) => read_outcome(&body),
            Err(e) => {
                warn!(error = %e, "Failed to read write response body");
                WriteOutcome::Unconfirmed
            }
        };

        match &outcome {
            WriteOutcome::Confirmed => info!("Catalog write confirmed"),
            WriteOutcome::Rejected { message } => warn!(%message, "Catalog write rejected"),
            WriteOutcome::Unconfirmed => warn!("Catalog write sent but not confirmed"),
        }

        if let Err(e) = self.store.invalidate().await {
            warn!(error = %e, "Failed to invalidate catalog cache after write");
        }

        Ok(outcome)
    }
}
