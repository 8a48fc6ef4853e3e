//! Integration tests for the loader chain: file snapshot, Sheets, static file.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use devpooja_catalog::{
    CatalogLoader, CatalogQuery, CatalogReady, FileSnapshotStore, LoadOutcome, SheetsSource,
    SnapshotStore, StaticFileSource,
};
use devpooja_core::{ProductId, Provenance};
use devpooja_integration_tests::{
    FakeServer, SHEETS_VALUES_PATH, bundled_catalog_path, sheets_config,
};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

const WINDOW: Duration = Duration::from_secs(300);

type Loader = CatalogLoader<SheetsSource, StaticFileSource, FileSnapshotStore>;

/// Router counting requests and answering with two sheet rows.
fn counting_sheet(hits: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            SHEETS_VALUES_PATH,
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "values": [
                        ["10", "Camphor Tablets", "pooja-items", "60", "", "", "", "30"],
                        ["11", "Rose Garland", "garlands", "150", "", "", "", "2", "true"]
                    ]
                }))
            }),
        )
        .with_state(hits)
}

fn loader(server: &FakeServer, timeout: Duration, fallback: &std::path::Path, dir: &TempDir) -> Loader {
    CatalogLoader::new(
        SheetsSource::new(sheets_config(&server.base_url(), timeout))
            .expect("Failed to build Sheets source"),
        StaticFileSource::new(fallback),
        FileSnapshotStore::new(dir.path().join(".cache/devpooja_products_cache.json")),
        WINDOW,
    )
}

#[tokio::test]
async fn test_slow_sheet_falls_back_to_bundled_file() {
    let router = Router::new().route(
        SHEETS_VALUES_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StatusCode::OK
        }),
    );
    let server = FakeServer::spawn(router).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let loader = loader(&server, Duration::from_millis(200), bundled_catalog_path(), &dir);
    let mut ready = loader.subscribe();

    let report = loader.load().await;

    assert_eq!(
        report.outcome,
        LoadOutcome::Fetched {
            provenance: Provenance::Fallback
        }
    );
    assert_eq!(report.catalog.len(), 6);
    assert_eq!(report.catalog.categories.len(), 6);
    assert_eq!(ready.try_recv(), Ok(CatalogReady));
    assert_eq!(ready.try_recv(), Err(TryRecvError::Empty));

    let snapshot = loader
        .store()
        .read()
        .await
        .expect("snapshot should be readable")
        .expect("snapshot should exist");
    assert_eq!(snapshot.source, Provenance::Fallback);
    assert_eq!(snapshot.products.len(), 6);
}

#[tokio::test]
async fn test_sheet_result_is_cached_for_the_window() {
    let hits = Arc::new(AtomicUsize::new(0));
    let server = FakeServer::spawn(counting_sheet(Arc::clone(&hits))).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let loader = loader(&server, Duration::from_secs(5), bundled_catalog_path(), &dir);

    let first = loader.load().await;
    let second = loader.load().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(first.provenance(), Some(Provenance::Sheets));
    assert!(matches!(
        second.outcome,
        LoadOutcome::Cached {
            provenance: Provenance::Sheets,
            ..
        }
    ));
    assert_eq!(second.catalog.as_ref(), first.catalog.as_ref());

    let catalog = loader.catalog().await;
    let garland = catalog
        .product(ProductId::new(11))
        .expect("garland should be loaded");
    assert!(garland.featured);
    assert_eq!(catalog.featured().count(), 1);
}

#[tokio::test]
async fn test_invalidate_refetches_from_sheet() {
    let hits = Arc::new(AtomicUsize::new(0));
    let server = FakeServer::spawn(counting_sheet(Arc::clone(&hits))).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let loader = loader(&server, Duration::from_secs(5), bundled_catalog_path(), &dir);

    loader.load().await;
    loader.invalidate().await.expect("invalidate should succeed");
    let report = loader.load().await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(report.provenance(), Some(Provenance::Sheets));
}

#[tokio::test]
async fn test_corrupt_snapshot_is_replaced() {
    let hits = Arc::new(AtomicUsize::new(0));
    let server = FakeServer::spawn(counting_sheet(Arc::clone(&hits))).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let loader = loader(&server, Duration::from_secs(5), bundled_catalog_path(), &dir);

    let cache_path = loader.store().path().to_path_buf();
    std::fs::create_dir_all(cache_path.parent().expect("cache path has a parent"))
        .expect("Failed to create cache dir");
    std::fs::write(&cache_path, "{\"timestamp\": ").expect("Failed to write cache");

    let report = loader.load().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(report.catalog.len(), 2);
    let raw = std::fs::read_to_string(&cache_path).expect("snapshot should be rewritten");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("snapshot should be JSON");
    assert_eq!(value["source"], "sheets");
    assert!(value["timestamp"].is_i64());
}

#[tokio::test]
async fn test_everything_down_yields_empty_catalog_and_one_ready() {
    let router = Router::new().route(
        SHEETS_VALUES_PATH,
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let server = FakeServer::spawn(router).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing-products.json");
    let loader = loader(&server, Duration::from_secs(5), &missing, &dir);
    let mut ready = loader.subscribe();

    let report = loader.load().await;

    assert_eq!(report.outcome, LoadOutcome::Unavailable);
    assert!(report.catalog.is_empty());
    assert!(report.catalog.categories.is_empty());
    assert_eq!(ready.try_recv(), Ok(CatalogReady));
    assert_eq!(ready.try_recv(), Err(TryRecvError::Empty));
    assert!(!loader.store().path().exists());
}
