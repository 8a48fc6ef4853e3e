//! Snapshot cache management.

use devpooja_catalog::{FileSnapshotStore, SnapshotStore};
use tracing::info;

use super::{CommandError, config};

/// Delete the cached catalog snapshot so the next load refetches.
pub async fn invalidate() -> Result<(), CommandError> {
    let config = config()?;
    let store = FileSnapshotStore::new(&config.cache_path);
    store.invalidate().await?;
    info!(path = %store.path().display(), "Catalog cache cleared");
    Ok(())
}
