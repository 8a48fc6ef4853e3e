//! Durable catalog snapshot storage.
//!
//! A snapshot is a single record `{ timestamp, products, categories, source }`
//! stored under one key. It is overwritten whole on every successful fetch and
//! deleted whole on invalidation. Content that fails to decode is reported as
//! [`CacheError::Corrupt`] so the caller can purge it.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use devpooja_core::{Catalog, CatalogItem, CategoryMap, Provenance};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from reading or writing the snapshot store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Stored content is not a valid snapshot.
    #[error("Corrupt snapshot: {0}")]
    Corrupt(serde_json::Error),

    /// The snapshot could not be serialized.
    #[error("Failed to encode snapshot: {0}")]
    Encode(serde_json::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted catalog with its capture time and provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Capture time, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub products: Vec<CatalogItem>,
    pub categories: CategoryMap,
    /// Source that produced the data.
    pub source: Provenance,
}

impl CacheSnapshot {
    /// Snapshot `catalog` as captured now.
    #[must_use]
    pub fn capture(catalog: &Catalog, source: Provenance) -> Self {
        Self::captured_at(catalog, source, Utc::now())
    }

    /// Snapshot `catalog` with an explicit capture time.
    #[must_use]
    pub fn captured_at(catalog: &Catalog, source: Provenance, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            products: catalog.products.clone(),
            categories: catalog.categories.clone(),
            source,
        }
    }

    /// Age at `now`, or `None` if the timestamp lies in the future.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.signed_duration_since(self.timestamp).to_std().ok()
    }

    /// Whether the snapshot is younger than `window` at `now`.
    ///
    /// Future-dated snapshots are never fresh. Provenance does not matter.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now).is_some_and(|age| age < window)
    }

    /// The cached catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        Catalog {
            products: self.products,
            categories: self.categories,
        }
    }
}

/// Single-key durable storage for the catalog snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot, `None` if there is none.
    fn read(&self) -> impl Future<Output = Result<Option<CacheSnapshot>, CacheError>> + Send;

    /// Replace the snapshot.
    fn write(&self, snapshot: &CacheSnapshot) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Delete the snapshot. Deleting an absent snapshot succeeds.
    fn invalidate(&self) -> impl Future<Output = Result<(), CacheError>> + Send;
}

fn decode(raw: &str) -> Result<CacheSnapshot, CacheError> {
    serde_json::from_str(raw).map_err(CacheError::Corrupt)
}

fn encode(snapshot: &CacheSnapshot) -> Result<String, CacheError> {
    serde_json::to_string(snapshot).map_err(CacheError::Encode)
}

// =============================================================================
// FileSnapshotStore
// =============================================================================

/// Snapshot stored as one JSON file.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// readers never see a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    async fn read(&self) -> Result<Option<CacheSnapshot>, CacheError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        let raw = encode(snapshot)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, raw).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// MemorySnapshotStore
// =============================================================================

/// In-process snapshot store holding the serialized record.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-serialized content as-is, valid or not.
    pub async fn put_raw(&self, raw: impl Into<String>) {
        *self.slot.write().await = Some(raw.into());
    }

    /// Whether anything is stored.
    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self) -> Result<Option<CacheSnapshot>, CacheError> {
        self.slot.read().await.as_deref().map(decode).transpose()
    }

    async fn write(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        let raw = encode(snapshot)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), CacheError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use devpooja_core::ProductId;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(300);

    fn catalog() -> Catalog {
        let mut item = CatalogItem::new(ProductId::new(1), "Ganesh Idol");
        item.category = "idols".to_string();
        Catalog::from_products(vec![item])
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let four_minutes = CacheSnapshot::captured_at(
            &catalog(),
            Provenance::Sheets,
            now - TimeDelta::minutes(4),
        );
        let six_minutes = CacheSnapshot::captured_at(
            &catalog(),
            Provenance::Fallback,
            now - TimeDelta::minutes(6),
        );
        assert!(four_minutes.is_fresh(now, WINDOW));
        assert!(!six_minutes.is_fresh(now, WINDOW));
    }

    #[test]
    fn test_window_boundary_is_stale() {
        let now = Utc::now();
        let snapshot =
            CacheSnapshot::captured_at(&catalog(), Provenance::Sheets, now - TimeDelta::minutes(5));
        assert!(!snapshot.is_fresh(now, WINDOW));
    }

    #[test]
    fn test_future_snapshot_is_stale() {
        let now = Utc::now();
        let snapshot =
            CacheSnapshot::captured_at(&catalog(), Provenance::Sheets, now + TimeDelta::minutes(1));
        assert_eq!(snapshot.age(now), None);
        assert!(!snapshot.is_fresh(now, WINDOW));
    }

    #[test]
    fn test_snapshot_wire_format() {
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let snapshot = CacheSnapshot::captured_at(&catalog(), Provenance::Fallback, timestamp);
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["categories"]["idols"], "Idols & Statues");
        assert_eq!(json["products"][0]["name"], "Ganesh Idol");
    }

    #[tokio::test]
    async fn test_file_store_write_read_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested/cache.json"));

        assert!(store.read().await.unwrap().is_none());

        let snapshot = CacheSnapshot::capture(&catalog(), Provenance::Sheets);
        store.write(&snapshot).await.unwrap();
        let read = store.read().await.unwrap().unwrap();
        assert_eq!(read.source, Provenance::Sheets);
        assert_eq!(read.timestamp.timestamp_millis(), snapshot.timestamp.timestamp_millis());
        assert!(!store.temp_path().exists());

        store.invalidate().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
        store.invalidate().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ definitely not a snapshot").unwrap();

        let store = FileSnapshotStore::new(&path);
        assert!(matches!(store.read().await, Err(CacheError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_memory_store_shares_slot_between_clones() {
        let store = MemorySnapshotStore::new();
        let other = store.clone();
        store
            .write(&CacheSnapshot::capture(&catalog(), Provenance::Fallback))
            .await
            .unwrap();
        assert!(other.read().await.unwrap().is_some());

        other.invalidate().await.unwrap();
        assert!(store.is_empty().await);

        store.put_raw("[]").await;
        assert!(matches!(store.read().await, Err(CacheError::Corrupt(_))));
    }
}
