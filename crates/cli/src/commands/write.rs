//! Sheet write commands.
//!
//! # Usage
//!
//! ```bash
//! devpooja write add --file draft.json
//! devpooja write update --id 5 --file draft.json
//! devpooja write delete --id 5
//! ```
//!
//! A draft file holds the product fields:
//!
//! ```json
//! { "name": "Brass Diya", "category": "diyas", "price": 149, "quantity": 12,
//!   "description": "...", "features": ["Pure brass"], "image": "https://...",
//!   "featured": false }
//! ```
//!
//! # Environment Variables
//!
//! - `APPS_SCRIPT_URL` - Apps Script web app endpoint
//! - `APPS_SCRIPT_TIMEOUT_SECS` - Request timeout (default 30)

use std::path::Path;

use devpooja_catalog::{CatalogWriter, FileSnapshotStore, ProductDraft, WriteOutcome};
use devpooja_core::ProductId;
use tracing::{info, warn};

use super::{CommandError, config};

fn writer() -> Result<CatalogWriter<FileSnapshotStore>, CommandError> {
    let config = config()?;
    let store = FileSnapshotStore::new(&config.cache_path);
    Ok(CatalogWriter::new(&config.apps_script, store)?)
}

async fn read_draft(path: &Path) -> Result<ProductDraft, CommandError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Turn an outcome into the command result.
fn settle(outcome: WriteOutcome) -> Result<(), CommandError> {
    match outcome {
        WriteOutcome::Confirmed => {
            info!("Sheet updated");
            Ok(())
        }
        WriteOutcome::Unconfirmed => {
            warn!("Request accepted but the sheet did not confirm the write; reload to verify");
            Ok(())
        }
        WriteOutcome::Rejected { message } => Err(CommandError::Rejected(message)),
    }
}

/// Append a product from a draft file.
pub async fn add(file: &Path) -> Result<(), CommandError> {
    let draft = read_draft(file).await?;
    info!(name = %draft.name, "Adding product");
    settle(writer()?.add(&draft).await?)
}

/// Replace a product from a draft file.
pub async fn update(id: ProductId, file: &Path) -> Result<(), CommandError> {
    let draft = read_draft(file).await?;
    info!(%id, name = %draft.name, "Updating product");
    settle(writer()?.update(id, &draft).await?)
}

/// Delete a product.
pub async fn delete(id: ProductId) -> Result<(), CommandError> {
    info!(%id, "Deleting product");
    settle(writer()?.delete(id).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settle() {
        assert!(settle(WriteOutcome::Confirmed).is_ok());
        assert!(settle(WriteOutcome::Unconfirmed).is_ok());
        assert!(matches!(
            settle(WriteOutcome::Rejected {
                message: "Product not found".to_string()
            }),
            Err(CommandError::Rejected(message)) if message == "Product not found"
        ));
    }

    #[tokio::test]
    async fn test_read_draft_requires_name_category_price() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        tokio::fs::write(&path, r#"{"name": "Kumkum"}"#).await.unwrap();
        assert!(matches!(read_draft(&path).await, Err(CommandError::Json(_))));

        tokio::fs::write(&path, r#"{"name": "Kumkum", "category": "pooja-items", "price": 49}"#)
            .await
            .unwrap();
        let draft = read_draft(&path).await.unwrap();
        assert_eq!(draft.quantity, 0);
        assert!(draft.features.is_empty());
    }
}
