//! Category keys and their display labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogItem;

/// Built-in display names for the storefront's known categories.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("incense", "Incense & Dhoop"),
    ("garlands", "Garlands & Flowers"),
    ("idols", "Idols & Statues"),
    ("diyas", "Diyas & Lamps"),
    ("pooja-items", "Pooja Items"),
    ("coconuts", "Coconuts & Fruits"),
];

/// Built-in display name for a category key, if it is a known one.
#[must_use]
pub fn display_name(key: &str) -> Option<&'static str> {
    DISPLAY_NAMES
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, label)| *label)
}

/// Mapping from category key to human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(BTreeMap<String, String>);

impl CategoryMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the map from the categories the items actually use.
    ///
    /// Known keys get their built-in label, unknown keys are labelled with
    /// the key itself. Items without a category are skipped.
    #[must_use]
    pub fn derive(items: &[CatalogItem]) -> Self {
        let mut map = BTreeMap::new();
        for item in items {
            let key = item.category.as_str();
            if key.is_empty() || map.contains_key(key) {
                continue;
            }
            let label = display_name(key).unwrap_or(key);
            map.insert(key.to_string(), label.to_string());
        }
        Self(map)
    }

    /// Insert or replace a label.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.0.insert(key.into(), label.into());
    }

    /// Label for a key, falling back to the raw key when it is unknown.
    #[must_use]
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.0.get(key).map_or(key, String::as_str)
    }

    /// Whether the map has an entry for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate `(key, label)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
