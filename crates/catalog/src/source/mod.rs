//! Catalog sources: the Google Sheets API and the bundled static file.
//!
//! # Architecture
//!
//! Every source implements [`CatalogSource`] and reports failures as a
//! [`SourceError`]. The loader never surfaces these errors; it logs the reason
//! and moves on to the next source in its fallback chain.

mod fallback;
pub mod rows;
mod sheets;

use std::future::Future;

use devpooja_core::{Catalog, Provenance};
use thiserror::Error;

pub use fallback::{StaticFileSource, decode_catalog};
pub use sheets::SheetsSource;

/// A backing source the loader can fetch a full catalog from.
pub trait CatalogSource: Send + Sync {
    /// Tag written to snapshots produced from this source.
    fn provenance(&self) -> Provenance;

    /// Fetch the whole catalog.
    fn fetch(&self) -> impl Future<Output = Result<Catalog, SourceError>> + Send;
}

/// Errors that can occur when fetching from a catalog source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Credentials or document id are unset or still placeholders.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document does not exist or is not publicly readable.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API key is invalid or the API is not enabled for it.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Request quota exhausted.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success HTTP status.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// The request did not complete within the configured bound.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, TLS or body transfer failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response was received but is not a usable row list.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Reading a local source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A local source is not valid catalog JSON.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
