//! Product data loader for the `DevPooja` storefront.
//!
//! The catalog is served from the first layer that can supply it: a fresh
//! durable snapshot, the Google Sheets values API, the bundled static file,
//! or the empty catalog. See [`loader`] for the chain and [`admin`] for the
//! write path that keeps the snapshot honest.
//!
//! # Example
//!
//! ```rust,no_run
//! use devpooja_catalog::{CatalogConfig, DefaultCatalogLoader};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::from_env()?;
//! let loader = DefaultCatalogLoader::from_config(&config)?;
//! let report = loader.load().await;
//! println!("{} products", report.catalog.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod cache;
pub mod config;
pub mod loader;
pub mod query;
pub mod source;

pub use admin::{CatalogWriter, ProductDraft, WriteAction, WriteError, WriteOutcome};
pub use cache::{CacheError, CacheSnapshot, FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use config::{AppsScriptConfig, CatalogConfig, ConfigError, SheetsConfig};
pub use loader::{CatalogLoader, CatalogReady, DefaultCatalogLoader, LoadOutcome, LoadReport};
pub use query::{CatalogQuery, DEFAULT_RELATED_LIMIT};
pub use source::{CatalogSource, SheetsSource, SourceError, StaticFileSource};
