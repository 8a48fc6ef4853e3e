//! Integration tests for `DevPooja`.
//!
//! Upstream services (the Sheets values API and the Apps Script web app) are
//! replaced by in-process axum servers bound to an ephemeral port, so the
//! tests need no network access or credentials.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p devpooja-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::Router;
use devpooja_catalog::{AppsScriptConfig, SheetsConfig};
use secrecy::SecretString;
use tokio::net::TcpListener;

/// A fake upstream server running on `127.0.0.1`.
pub struct FakeServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeServer {
    /// Serve `router` on an ephemeral port until dropped.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self { addr, handle }
    }

    /// `http://127.0.0.1:{port}`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Sheets settings pointed at `base_url` with valid-looking credentials.
#[must_use]
pub fn sheets_config(base_url: &str, timeout: Duration) -> SheetsConfig {
    SheetsConfig {
        api_key: Some(SecretString::from("AIzaSyTestKey123")),
        spreadsheet_id: Some("1DevPoojaTestSheet".to_string()),
        base_url: format!("{base_url}/v4"),
        timeout,
        ..SheetsConfig::default()
    }
}

/// Apps Script settings pointed at `url`.
#[must_use]
pub fn apps_script_config(url: String) -> AppsScriptConfig {
    AppsScriptConfig {
        url: Some(url),
        timeout: Duration::from_secs(5),
    }
}

/// Path of the `values` endpoint the Sheets source requests.
pub const SHEETS_VALUES_PATH: &str = "/v4/spreadsheets/1DevPoojaTestSheet/values/{range}";

/// The bundled static catalog shipped at `data/products.json`.
#[must_use]
pub fn bundled_catalog_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/products.json"))
}
