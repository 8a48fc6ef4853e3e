//! Subcommand implementations.

pub mod cache;
pub mod catalog;
pub mod write;

use devpooja_catalog::{CacheError, CatalogConfig, ConfigError, SourceError, WriteError};
use devpooja_core::ProductId;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The loader could not be built.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The snapshot store failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// A sheet write failed.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// The sheet refused a write.
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// No product with that id in the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Every catalog layer failed.
    #[error("Catalog unavailable: cache, Sheets and static file all failed")]
    Unavailable,

    /// No products in that category.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A local file or output is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load configuration from the environment (and `.env`).
fn config() -> Result<CatalogConfig, CommandError> {
    Ok(CatalogConfig::from_env()?)
}
