//! Core types for the DevPooja catalog.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod catalog;
pub mod category;
pub mod features;
pub mod id;
pub mod lenient;
pub mod price;
pub mod provenance;
pub mod stock;

pub use catalog::{Catalog, CatalogItem, resolve_ids};
pub use category::{CategoryMap, display_name};
pub use features::{FEATURE_DELIMITER, join_features, split_features};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use provenance::Provenance;
pub use stock::{LOW_STOCK_THRESHOLD, StockStatus};
