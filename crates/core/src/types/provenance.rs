//! Which backing source produced a catalog snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance tag carried by every cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Remote spreadsheet API.
    Sheets,
    /// Bundled static JSON file.
    #[serde(alias = "json")]
    Fallback,
}

impl Provenance {
    /// Tag as written to the snapshot.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sheets => "sheets",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provenance::Fallback).unwrap(),
            "\"fallback\""
        );
        assert_eq!(
            serde_json::to_string(&Provenance::Sheets).unwrap(),
            "\"sheets\""
        );
    }

    #[test]
    fn test_legacy_json_tag_reads_as_fallback() {
        let provenance: Provenance = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(provenance, Provenance::Fallback);
    }
}
