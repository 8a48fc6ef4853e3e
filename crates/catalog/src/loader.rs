//! Product data loader.
//!
//! Produces the catalog from the first layer that can supply it:
//!
//! 1. a snapshot younger than the freshness window (no network access),
//! 2. the primary source (Google Sheets, bounded by a hard timeout),
//! 3. the fallback source (bundled static file),
//! 4. the empty catalog.
//!
//! Every failure downgrades to the next layer; `load()` itself never fails.
//! Each call settles the shared catalog state and then broadcasts exactly one
//! [`CatalogReady`], also when every layer failed, so listeners never wait on
//! a load that will not finish.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use devpooja_core::{Catalog, Provenance};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{CacheError, CacheSnapshot, FileSnapshotStore, SnapshotStore};
use crate::config::CatalogConfig;
use crate::source::{CatalogSource, SheetsSource, SourceError, StaticFileSource};

/// Buffered notifications per subscriber before old ones are dropped.
const READY_CHANNEL_CAPACITY: usize = 16;

/// Broadcast after every `load()` once the catalog state is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogReady;

/// Which layer of the fallback chain produced the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from a fresh snapshot.
    Cached {
        /// Source that originally produced the snapshot.
        provenance: Provenance,
        /// Snapshot age when it was served.
        age: Duration,
    },
    /// Fetched from a source and written to the snapshot store.
    Fetched { provenance: Provenance },
    /// Every source failed; the catalog is empty.
    Unavailable,
}

/// Result of a single `load()` call.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub catalog: Arc<Catalog>,
    pub outcome: LoadOutcome,
}

impl LoadReport {
    /// Whether any layer supplied data.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self.outcome, LoadOutcome::Unavailable)
    }

    /// Provenance of the data, if any layer supplied it.
    #[must_use]
    pub const fn provenance(&self) -> Option<Provenance> {
        match self.outcome {
            LoadOutcome::Cached { provenance, .. } | LoadOutcome::Fetched { provenance } => {
                Some(provenance)
            }
            LoadOutcome::Unavailable => None,
        }
    }
}

/// Loader wired to the production sources and the file snapshot store.
pub type DefaultCatalogLoader = CatalogLoader<SheetsSource, StaticFileSource, FileSnapshotStore>;

/// Catalog loader with a freshness-gated snapshot and a source fallback chain.
///
/// Cheap to clone; clones share sources, store, state and subscribers.
pub struct CatalogLoader<P, F, S> {
    inner: Arc<CatalogLoaderInner<P, F, S>>,
}

struct CatalogLoaderInner<P, F, S> {
    primary: P,
    fallback: F,
    store: S,
    freshness_window: Duration,
    state: RwLock<Arc<Catalog>>,
    ready: broadcast::Sender<CatalogReady>,
}

impl<P, F, S> Clone for CatalogLoader<P, F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DefaultCatalogLoader {
    /// Build the production loader from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Transport` if the HTTP client fails to build.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            SheetsSource::new(config.sheets.clone())?,
            StaticFileSource::new(&config.fallback_path),
            FileSnapshotStore::new(&config.cache_path),
            config.freshness_window,
        ))
    }
}

impl<P, F, S> CatalogLoader<P, F, S>
where
    P: CatalogSource,
    F: CatalogSource,
    S: SnapshotStore,
{
    /// Create a loader over the given sources and snapshot store.
    #[must_use]
    pub fn new(primary: P, fallback: F, store: S, freshness_window: Duration) -> Self {
        let (ready, _) = broadcast::channel(READY_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CatalogLoaderInner {
                primary,
                fallback,
                store,
                freshness_window,
                state: RwLock::new(Arc::new(Catalog::empty())),
                ready,
            }),
        }
    }

    /// Subscribe to ready notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogReady> {
        self.inner.ready.subscribe()
    }

    /// The catalog settled by the most recent `load()`; empty before the first.
    pub async fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&*self.inner.state.read().await)
    }

    /// The snapshot store shared with writers.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Delete the snapshot so the next `load()` refetches.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the store cannot delete the snapshot.
    pub async fn invalidate(&self) -> Result<(), CacheError> {
        self.inner.store.invalidate().await
    }

    /// Run the fallback chain, settle the shared state and notify subscribers.
    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadReport {
        let (catalog, outcome) = self.resolve().await;
        let catalog = Arc::new(catalog);

        // Last write wins when loads overlap
        *self.inner.state.write().await = Arc::clone(&catalog);

        // Sending only fails when nobody is subscribed
        let _ = self.inner.ready.send(CatalogReady);

        LoadReport { catalog, outcome }
    }

    async fn resolve(&self) -> (Catalog, LoadOutcome) {
        if let Some(snapshot) = self.fresh_snapshot().await {
            let provenance = snapshot.source;
            let age = snapshot.age(Utc::now()).unwrap_or_default();
            let catalog = snapshot.into_catalog();
            info!(
                source = %provenance,
                age_secs = age.as_secs(),
                products = catalog.len(),
                "Loaded catalog from cache"
            );
            return (catalog, LoadOutcome::Cached { provenance, age });
        }

        info!("Cache expired or missing, fetching fresh data");

        let primary = self.inner.primary.provenance();
        match self.fetch_from(&self.inner.primary).await {
            Ok(catalog) => return (catalog, LoadOutcome::Fetched { provenance: primary }),
            Err(e) => warn!(
                source = %primary,
                error = %e,
                "Primary catalog source failed, falling back"
            ),
        }

        let fallback = self.inner.fallback.provenance();
        match self.fetch_from(&self.inner.fallback).await {
            Ok(catalog) => return (catalog, LoadOutcome::Fetched { provenance: fallback }),
            Err(e) => error!(
                source = %fallback,
                error = %e,
                "All catalog sources failed, serving empty catalog"
            ),
        }

        (Catalog::empty(), LoadOutcome::Unavailable)
    }

    /// Fetch from one source and snapshot the result.
    async fn fetch_from<Src: CatalogSource>(&self, source: &Src) -> Result<Catalog, SourceError> {
        let catalog = source.fetch().await?;
        let provenance = source.provenance();

        let snapshot = CacheSnapshot::capture(&catalog, provenance);
        if let Err(e) = self.inner.store.write(&snapshot).await {
            warn!(error = %e, "Failed to cache catalog snapshot");
        }

        info!(
            source = %provenance,
            products = catalog.len(),
            "Loaded catalog from source"
        );
        Ok(catalog)
    }

    /// The stored snapshot if it is fresh. Corrupt snapshots are purged.
    async fn fresh_snapshot(&self) -> Option<CacheSnapshot> {
        match self.inner.store.read().await {
            Ok(Some(snapshot)) if snapshot.is_fresh(Utc::now(), self.inner.freshness_window) => {
                Some(snapshot)
            }
            Ok(Some(snapshot)) => {
                debug!(
                    source = %snapshot.source,
                    captured_at = %snapshot.timestamp,
                    "Cached catalog is stale"
                );
                None
            }
            Ok(None) => None,
            Err(CacheError::Corrupt(e)) => {
                warn!(error = %e, "Invalid cache data, clearing");
                if let Err(e) = self.inner.store.invalidate().await {
                    warn!(error = %e, "Failed to clear invalid cache data");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cached catalog");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;
    use devpooja_core::{CatalogItem, ProductId};
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::cache::MemorySnapshotStore;

    const WINDOW: Duration = Duration::from_secs(300);

    type Outcome = Box<dyn Fn() -> Result<Catalog, SourceError> + Send + Sync>;

    /// Source returning a canned result and recording every call.
    struct StubSource {
        provenance: Provenance,
        calls: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<Provenance>>>,
        outcome: Outcome,
    }

    impl StubSource {
        fn new(provenance: Provenance, log: &Arc<Mutex<Vec<Provenance>>>, outcome: Outcome) -> Self {
            Self {
                provenance,
                calls: Arc::new(AtomicUsize::new(0)),
                log: Arc::clone(log),
                outcome,
            }
        }
    }

    impl CatalogSource for StubSource {
        fn provenance(&self) -> Provenance {
            self.provenance
        }

        async fn fetch(&self) -> Result<Catalog, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.provenance);
            (self.outcome)()
        }
    }

    fn items(count: i64, prefix: &str) -> Catalog {
        Catalog::from_products(
            (1..=count)
                .map(|id| {
                    let mut item = CatalogItem::new(ProductId::new(id), format!("{prefix} {id}"));
                    item.category = "diyas".to_string();
                    item
                })
                .collect(),
        )
    }

    struct Harness {
        loader: CatalogLoader<StubSource, StubSource, MemorySnapshotStore>,
        store: MemorySnapshotStore,
        primary_calls: Arc<AtomicUsize>,
        fallback_calls: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<Provenance>>>,
    }

    fn harness(primary: Outcome, fallback: Outcome) -> Harness {
        let log = Arc::new(Mutex::new(Vec::new()));
        let primary = StubSource::new(Provenance::Sheets, &log, primary);
        let fallback = StubSource::new(Provenance::Fallback, &log, fallback);
        let primary_calls = Arc::clone(&primary.calls);
        let fallback_calls = Arc::clone(&fallback.calls);
        let store = MemorySnapshotStore::new();
        Harness {
            loader: CatalogLoader::new(primary, fallback, store.clone(), WINDOW),
            store,
            primary_calls,
            fallback_calls,
            log,
        }
    }

    fn ok(count: i64, prefix: &'static str) -> Outcome {
        Box::new(move || Ok(items(count, prefix)))
    }

    fn fail(make: fn() -> SourceError) -> Outcome {
        Box::new(move || Err(make()))
    }

    async fn seed(store: &MemorySnapshotStore, age: TimeDelta, provenance: Provenance) {
        let snapshot = CacheSnapshot::captured_at(&items(2, "Cached"), provenance, Utc::now() - age);
        store.write(&snapshot).await.unwrap();
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_sources() {
        let h = harness(ok(3, "Sheet"), ok(6, "Static"));
        seed(&h.store, TimeDelta::minutes(4), Provenance::Fallback).await;

        let report = h.loader.load().await;

        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.catalog.len(), 2);
        assert!(matches!(
            report.outcome,
            LoadOutcome::Cached {
                provenance: Provenance::Fallback,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_cache_refetches_from_primary() {
        let h = harness(ok(3, "Sheet"), ok(6, "Static"));
        seed(&h.store, TimeDelta::minutes(6), Provenance::Sheets).await;

        let report = h.loader.load().await;

        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.catalog.len(), 3);
        assert_eq!(report.provenance(), Some(Provenance::Sheets));

        let snapshot = h.store.read().await.unwrap().unwrap();
        assert_eq!(snapshot.source, Provenance::Sheets);
        assert_eq!(snapshot.products.len(), 3);
    }

    #[tokio::test]
    async fn test_primary_attempted_once_before_fallback() {
        let h = harness(
            fail(|| SourceError::MalformedResponse("response has no row list".to_string())),
            ok(6, "Static"),
        );

        let report = h.loader.load().await;

        assert_eq!(
            *h.log.lock().unwrap(),
            vec![Provenance::Sheets, Provenance::Fallback]
        );
        assert_eq!(report.catalog.len(), 6);
        assert_eq!(report.provenance(), Some(Provenance::Fallback));
    }

    #[tokio::test]
    async fn test_timeout_falls_back_and_caches_with_fallback_provenance() {
        let h = harness(
            fail(|| SourceError::Timeout(Duration::from_secs(10))),
            ok(6, "Static"),
        );
        let mut ready = h.loader.subscribe();

        let report = h.loader.load().await;

        assert_eq!(report.catalog.len(), 6);
        let snapshot = h.store.read().await.unwrap().unwrap();
        assert_eq!(snapshot.source, Provenance::Fallback);
        assert_eq!(snapshot.products.len(), 6);
        assert_eq!(ready.try_recv(), Ok(CatalogReady));
        assert_eq!(ready.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_all_sources_fail_still_notifies() {
        let h = harness(
            fail(|| SourceError::Config("SHEETS_API_KEY is not set".to_string())),
            fail(|| SourceError::Io(std::io::Error::from(std::io::ErrorKind::NotFound))),
        );
        let mut ready = h.loader.subscribe();

        let report = h.loader.load().await;

        assert_eq!(report.outcome, LoadOutcome::Unavailable);
        assert!(!report.is_available());
        assert!(report.catalog.is_empty());
        assert!(report.catalog.categories.is_empty());
        assert!(h.loader.catalog().await.is_empty());
        assert!(h.store.is_empty().await);
        assert_eq!(ready.try_recv(), Ok(CatalogReady));
        assert_eq!(ready.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_one_notification_per_load() {
        let h = harness(ok(1, "Sheet"), ok(6, "Static"));
        let mut first = h.loader.subscribe();
        let mut second = h.loader.subscribe();

        h.loader.load().await;
        h.loader.load().await;

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.try_recv(), Ok(CatalogReady));
            assert_eq!(rx.try_recv(), Ok(CatalogReady));
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        }
        // The second load was served from the snapshot written by the first
        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_purged_and_refetched() {
        let h = harness(ok(3, "Sheet"), ok(6, "Static"));
        h.store.put_raw("{\"timestamp\": \"yesterday\"").await;

        let report = h.loader.load().await;

        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.catalog.len(), 3);
        assert!(h.store.read().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let h = harness(ok(3, "Sheet"), ok(6, "Static"));

        h.loader.load().await;
        h.loader.invalidate().await.unwrap();
        h.loader.load().await;

        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_state_starts_empty_and_tracks_last_load() {
        let h = harness(ok(3, "Sheet"), ok(6, "Static"));
        assert!(h.loader.catalog().await.is_empty());

        h.loader.load().await;
        assert_eq!(h.loader.catalog().await.len(), 3);
    }
}
