//! Google Sheets API source.
//!
//! Reads a fixed cell range with an API key:
//! `GET {base}/spreadsheets/{id}/values/{range}?key={api_key}`.
//! The whole request, body included, is bounded by the configured timeout.

use std::time::Duration;

use devpooja_core::{Catalog, Provenance};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogSource, SourceError, rows};
use crate::config::SheetsConfig;

/// Catalog source backed by the Google Sheets values API.
#[derive(Clone)]
pub struct SheetsSource {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsSource {
    /// Create a new Sheets source.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Transport` if the HTTP client fails to build.
    pub fn new(config: SheetsConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Request URL for the configured range, including the API key.
    fn values_url(&self, spreadsheet_id: &str, api_key: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| SourceError::Config(format!("invalid SHEETS_BASE_URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SourceError::Config("SHEETS_BASE_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["spreadsheets", spreadsheet_id, "values", self.config.range.as_str()]);
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    const fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout())
        } else {
            SourceError::Transport(err)
        }
    }
}

impl CatalogSource for SheetsSource {
    fn provenance(&self) -> Provenance {
        Provenance::Sheets
    }

    #[instrument(skip(self), fields(range = %self.config.range))]
    async fn fetch(&self) -> Result<Catalog, SourceError> {
        let credentials = self.config.credentials().map_err(SourceError::Config)?;
        let url = self.values_url(credentials.spreadsheet_id, credentials.api_key)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(status_error(status, retry_after));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let rows = extract_rows(&body)?;
        debug!(rows = rows.len(), "Received spreadsheet rows");

        Ok(Catalog::from_products(rows::parse_rows(&rows)))
    }
}

/// Map a non-success status to a diagnosable failure.
fn status_error(status: StatusCode, retry_after: u64) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::AccessDenied(
            "API key invalid or Sheets API not enabled".to_string(),
        ),
        StatusCode::NOT_FOUND => SourceError::NotFound(
            "Spreadsheet not found or not publicly accessible".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(retry_after),
        other => SourceError::Http {
            status: other.as_u16(),
            message: other.canonical_reason().unwrap_or("unknown status").to_string(),
        },
    }
}

/// Validate the response shape and pull out the row list.
///
/// An absent, non-list or empty `values` field is a failure, never an empty
/// catalog.
fn extract_rows(body: &str) -> Result<Vec<Vec<Value>>, SourceError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| SourceError::MalformedResponse(format!("response is not JSON: {e}")))?;

    let Some(Value::Array(rows)) = payload.get("values") else {
        return Err(SourceError::MalformedResponse(
            "response has no row list".to_string(),
        ));
    };

    if rows.is_empty() {
        return Err(SourceError::MalformedResponse(
            "spreadsheet is empty".to_string(),
        ));
    }

    rows.iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Array(cells) => Ok(cells.clone()),
            _ => Err(SourceError::MalformedResponse(format!(
                "row {} is not a list of cells",
                index + 1
            ))),
        })
        .collect()
}
