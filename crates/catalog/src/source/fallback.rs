//! Bundled static catalog file.
//!
//! The file has the shape `{ "products": [...], "categories": {...} }`.
//! Items without a usable id get their 1-based position (or the next free id
//! when another item claims it), a missing category map is derived from the
//! products, and repeated explicit ids keep the first item.

use std::path::{Path, PathBuf};

use devpooja_core::{Catalog, CatalogItem, CategoryMap, Provenance, lenient, resolve_ids};
use serde::Deserialize;
use serde_json::Value;
use tracing::{instrument, warn};

use super::{CatalogSource, SourceError};

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    products: Vec<Value>,
    #[serde(default)]
    categories: CategoryMap,
}

/// Catalog source that reads a JSON file from disk.
#[derive(Debug, Clone)]
pub struct StaticFileSource {
    path: PathBuf,
}

impl StaticFileSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the catalog is read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for StaticFileSource {
    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Catalog, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        decode_catalog(&content)
    }
}

/// Decode the static catalog document.
///
/// # Errors
///
/// Returns `SourceError::Decode` if the document or any item is not valid
/// catalog JSON.
pub fn decode_catalog(content: &str) -> Result<Catalog, SourceError> {
    let raw: RawCatalog = serde_json::from_str(content)?;

    let entries = raw
        .products
        .into_iter()
        .enumerate()
        .map(|(index, mut value)| {
            let mut explicit = None;
            if let Value::Object(fields) = &mut value {
                explicit = fields.get("id").and_then(lenient::product_id);
                let id = explicit.map_or_else(|| Value::from(index + 1), |id| Value::from(id.as_i64()));
                fields.insert("id".to_string(), id);
            }
            serde_json::from_value::<CatalogItem>(value).map(|item| (explicit, item))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (items, dropped) = resolve_ids(entries);
    if !dropped.is_empty() {
        warn!(
            duplicate_ids = ?dropped,
            "Dropped static catalog items with duplicate product ids"
        );
    }

    Ok(Catalog {
        products: items,
        categories: raw.categories,
    }
    .with_derived_categories())
}
