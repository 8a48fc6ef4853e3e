//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Primary source (Google Sheets)
//! - `SHEETS_API_KEY` - API key with read access to the Sheets API
//! - `SHEETS_SPREADSHEET_ID` - Spreadsheet document ID
//! - `SHEETS_RANGE` - Cell range to read (default: `Products!A2:M`)
//! - `SHEETS_BASE_URL` - API base URL (default: `https://sheets.googleapis.com/v4`)
//! - `SHEETS_TIMEOUT_SECS` - Hard request timeout (default: 10)
//!
//! ## Fallback and cache
//! - `CATALOG_FALLBACK_PATH` - Static catalog file (default: `data/products.json`)
//! - `CATALOG_CACHE_PATH` - Snapshot file (default: `.cache/devpooja_products_cache.json`)
//! - `CATALOG_CACHE_TTL_SECS` - Freshness window (default: 300)
//!
//! ## Admin writes
//! - `APPS_SCRIPT_URL` - Apps Script web app endpoint
//! - `APPS_SCRIPT_TIMEOUT_SECS` - Write request timeout (default: 30)
//!
//! The Sheets credentials and the Apps Script URL are optional here: a
//! missing or placeholder credential is reported when the source is used,
//! so the loader can fall back instead of refusing to start.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Default Sheets API base URL.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Default product range: columns A..M, skipping the header row.
pub const DEFAULT_SHEETS_RANGE: &str = "Products!A2:M";

/// Default location of the bundled catalog file.
pub const DEFAULT_FALLBACK_PATH: &str = "data/products.json";

/// Default location of the durable snapshot.
pub const DEFAULT_CACHE_PATH: &str = ".cache/devpooja_products_cache.json";

const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_APPS_SCRIPT_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your_",
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Primary source settings
    pub sheets: SheetsConfig,
    /// Path of the static fallback catalog
    pub fallback_path: PathBuf,
    /// Path of the durable snapshot file
    pub cache_path: PathBuf,
    /// Age after which a snapshot is refetched
    pub freshness_window: Duration,
    /// Admin write endpoint settings
    pub apps_script: AppsScriptConfig,
}

/// Google Sheets API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SheetsConfig {
    /// API key (unset when not configured)
    pub api_key: Option<SecretString>,
    /// Spreadsheet document ID (unset when not configured)
    pub spreadsheet_id: Option<String>,
    /// Cell range, e.g. `Products!A2:M`
    pub range: String,
    /// API base URL, overridable for tests
    pub base_url: String,
    /// Hard timeout for the whole request
    pub timeout: Duration,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            spreadsheet_id: None,
            range: DEFAULT_SHEETS_RANGE.to_string(),
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_SHEETS_TIMEOUT_SECS),
        }
    }
}

/// Credentials that passed validation.
pub struct SheetsCredentials<'a> {
    pub api_key: &'a str,
    pub spreadsheet_id: &'a str,
}

impl SheetsConfig {
    /// Validated credentials, or a description of what is missing.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the API key or spreadsheet ID is
    /// unset, blank, or still a template placeholder.
    pub fn credentials(&self) -> Result<SheetsCredentials<'_>, String> {
        let api_key = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| "SHEETS_API_KEY is not set".to_string())?;
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| "SHEETS_SPREADSHEET_ID is not set".to_string())?;

        if let Some(reason) = placeholder_reason(api_key) {
            return Err(format!("SHEETS_API_KEY {reason}"));
        }
        if let Some(reason) = placeholder_reason(spreadsheet_id) {
            return Err(format!("SHEETS_SPREADSHEET_ID {reason}"));
        }

        Ok(SheetsCredentials {
            api_key,
            spreadsheet_id,
        })
    }
}

/// Apps Script web app configuration for admin writes.
#[derive(Debug, Clone)]
pub struct AppsScriptConfig {
    /// Web app URL (unset when writes are not configured)
    pub url: Option<String>,
    /// Timeout for a single write request
    pub timeout: Duration,
}

impl AppsScriptConfig {
    /// Validated web app URL, or a description of what is wrong with it.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the URL is unset, blank, or still
    /// a template placeholder.
    pub fn endpoint(&self) -> Result<&str, String> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| "APPS_SCRIPT_URL is not set".to_string())?;
        if let Some(reason) = placeholder_reason(url) {
            return Err(format!("APPS_SCRIPT_URL {reason}"));
        }
        Ok(url)
    }
}

impl Default for AppsScriptConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(DEFAULT_APPS_SCRIPT_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric setting cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let sheets = SheetsConfig {
            api_key: non_empty(lookup("SHEETS_API_KEY")).map(SecretString::from),
            spreadsheet_id: non_empty(lookup("SHEETS_SPREADSHEET_ID")),
            range: lookup("SHEETS_RANGE").unwrap_or_else(|| DEFAULT_SHEETS_RANGE.to_string()),
            base_url: lookup("SHEETS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
            timeout: get_secs(
                &lookup,
                "SHEETS_TIMEOUT_SECS",
                DEFAULT_SHEETS_TIMEOUT_SECS,
            )?,
        };

        let apps_script = AppsScriptConfig {
            url: non_empty(lookup("APPS_SCRIPT_URL")),
            timeout: get_secs(
                &lookup,
                "APPS_SCRIPT_TIMEOUT_SECS",
                DEFAULT_APPS_SCRIPT_TIMEOUT_SECS,
            )?,
        };

        Ok(Self {
            sheets,
            fallback_path: lookup("CATALOG_FALLBACK_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_FALLBACK_PATH), PathBuf::from),
            cache_path: lookup("CATALOG_CACHE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH), PathBuf::from),
            freshness_window: get_secs(&lookup, "CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            apps_script,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Treat blank values the same as unset ones.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a whole number of seconds, falling back to a default when unset.
fn get_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Why a credential looks like an unfilled template value, if it does.
fn placeholder_reason(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("is blank".to_string());
    }
    let lower = value.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .find(|pattern| lower.contains(*pattern))
        .map(|pattern| format!("appears to be a placeholder (contains '{pattern}')"))
}
