//! Catalog items and catalog snapshots.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::category::CategoryMap;
use super::features::split_features;
use super::id::ProductId;
use super::lenient;
use super::price::Price;
use super::stock::StockStatus;

/// A sellable item in the storefront catalog.
///
/// Deserialization is lenient: numeric fields accept strings, missing fields
/// take their defaults, and `features` may be a list or a single
/// pipe-delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique within a catalog snapshot.
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub name: String,
    /// Key into the catalog's [`CategoryMap`].
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub category: String,
    /// Never negative.
    #[serde(default, deserialize_with = "lenient::deserialize_price")]
    pub price: Decimal,
    /// Stock on hand.
    #[serde(default, deserialize_with = "lenient::deserialize_quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub description: String,
    /// Ordered feature bullets.
    #[serde(default, deserialize_with = "deserialize_features")]
    pub features: Vec<String>,
    /// Primary image URL or path.
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub image: String,
    /// Secondary gallery images, in display order.
    #[serde(default, deserialize_with = "deserialize_images", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::deserialize_flag")]
    pub featured: bool,
}

impl CatalogItem {
    /// Create an item with the given identity and every other field defaulted.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: String::new(),
            price: Decimal::ZERO,
            quantity: 0,
            description: String::new(),
            features: Vec::new(),
            image: String::new(),
            images: Vec::new(),
            featured: false,
        }
    }

    /// Price in the storefront currency.
    #[must_use]
    pub const fn display_price(&self) -> Price {
        Price::inr(self.price)
    }

    /// Stock level for badges and cart limits.
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// Primary image followed by the gallery images.
    pub fn all_images(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.image.as_str())
            .filter(|image| !image.is_empty())
            .chain(self.images.iter().map(String::as_str))
    }
}

/// A consistent `(products, categories)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<CatalogItem>,
    #[serde(default)]
    pub categories: CategoryMap,
}

impl Catalog {
    /// The empty catalog: the terminal state when no source is reachable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog, deriving the category map from the products.
    #[must_use]
    pub fn from_products(products: Vec<CatalogItem>) -> Self {
        let categories = CategoryMap::derive(&products);
        Self {
            products,
            categories,
        }
    }

    /// Fill in the category map from the products when it is empty.
    #[must_use]
    pub fn with_derived_categories(mut self) -> Self {
        if self.categories.is_empty() {
            self.categories = CategoryMap::derive(&self.products);
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Settle the ids of decoded items, returning the ids of dropped duplicates.
///
/// Each entry pairs an item with the id its source stated explicitly, if any.
/// Explicit ids win: the first item claiming one keeps it and later claims are
/// dropped. Items without an explicit id keep their positional id unless it is
/// already in use, in which case they move to the next free id.
#[must_use]
pub fn resolve_ids(entries: Vec<(Option<ProductId>, CatalogItem)>) -> (Vec<CatalogItem>, Vec<ProductId>) {
    let mut taken: HashSet<ProductId> = entries.iter().filter_map(|(explicit, _)| *explicit).collect();
    let mut claimed = HashSet::with_capacity(taken.len());
    let mut dropped = Vec::new();
    let mut kept = Vec::with_capacity(entries.len());

    for (explicit, mut item) in entries {
        if let Some(id) = explicit {
            if claimed.insert(id) {
                item.id = id;
                kept.push(item);
            } else {
                dropped.push(id);
            }
            continue;
        }
        let mut id = item.id;
        while taken.contains(&id) && id.as_i64() < i64::MAX {
            id = ProductId::new(id.as_i64() + 1);
        }
        taken.insert(id);
        item.id = id;
        kept.push(item);
    }
    (kept, dropped)
}

fn deserialize_images<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(lenient::text)
            .filter(|entry| !entry.is_empty())
            .collect(),
        Some(single @ Value::String(_)) => {
            let entry = lenient::text(&single);
            if entry.is_empty() { Vec::new() } else { vec![entry] }
        }
        _ => Vec::new(),
    })
}

fn deserialize_features<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(lenient::text)
            .filter(|entry| !entry.is_empty())
            .collect(),
        Some(Value::String(raw)) => split_features(&raw),
        _ => Vec::new(),
    })
}
