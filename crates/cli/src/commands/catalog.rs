//! Catalog read commands: `load`, `show` and `category`.
//!
//! Each command runs one load through the full chain, so a fresh snapshot is
//! reused and a stale one is refreshed.

#![allow(clippy::print_stdout)]

use devpooja_catalog::{CatalogQuery, DEFAULT_RELATED_LIMIT, DefaultCatalogLoader, LoadOutcome, LoadReport};
use devpooja_core::{CatalogItem, ProductId};

use super::{CommandError, config};

async fn load_report() -> Result<LoadReport, CommandError> {
    let config = config()?;
    let loader = DefaultCatalogLoader::from_config(&config)?;
    Ok(loader.load().await)
}

fn describe(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Cached { provenance, age } => {
            format!("cache ({provenance}, {}s old)", age.as_secs())
        }
        LoadOutcome::Fetched { provenance } => provenance.to_string(),
        LoadOutcome::Unavailable => "none (all sources failed)".to_string(),
    }
}

fn summary_line(item: &CatalogItem) -> String {
    let badge = item
        .stock_status()
        .badge()
        .map(|badge| format!("  [{badge}]"))
        .unwrap_or_default();
    let star = if item.featured { " *" } else { "" };
    format!(
        "{:>4}  {}{star}  {}{badge}",
        item.id.as_i64(),
        item.name,
        item.display_price()
    )
}

/// Load the catalog and print a summary, or the catalog as JSON.
pub async fn load(json: bool) -> Result<(), CommandError> {
    let report = load_report().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(report.catalog.as_ref())?);
        return Ok(());
    }

    println!("Source:     {}", describe(&report.outcome));
    println!("Products:   {}", report.catalog.len());
    println!("Categories: {}", report.catalog.categories.len());
    println!("Featured:   {}", report.catalog.featured().count());
    ensure_available(&report)
}

/// Fail the command when no layer supplied data, after the summary is shown.
fn ensure_available(report: &LoadReport) -> Result<(), CommandError> {
    if report.is_available() {
        Ok(())
    } else {
        Err(CommandError::Unavailable)
    }
}

/// Print one product with its related items.
pub async fn show(id: ProductId) -> Result<(), CommandError> {
    let report = load_report().await?;
    let catalog = report.catalog.as_ref();
    let item = catalog
        .product(id)
        .ok_or(CommandError::ProductNotFound(id))?;

    println!("{}", summary_line(item));
    println!("Category: {}", catalog.category_label(&item.category));
    println!("Quantity: {}", item.quantity);
    if !item.description.is_empty() {
        println!("\n{}", item.description);
    }
    for feature in &item.features {
        println!("  - {feature}");
    }
    for image in item.all_images() {
        println!("Image: {image}");
    }

    let related = catalog.related(item, DEFAULT_RELATED_LIMIT);
    if !related.is_empty() {
        println!("\nRelated:");
        for other in related {
            println!("{}", summary_line(other));
        }
    }
    Ok(())
}

/// List categories with product counts, or the products in `key`.
pub async fn category(key: Option<&str>) -> Result<(), CommandError> {
    let report = load_report().await?;
    let catalog = report.catalog.as_ref();

    let Some(key) = key else {
        for (key, label) in catalog.categories.iter() {
            println!("{key:<14} {label} ({})", catalog.by_category(key).count());
        }
        return Ok(());
    };

    let items: Vec<&CatalogItem> = catalog.by_category(key).collect();
    if items.is_empty() && !catalog.categories.contains(key) {
        return Err(CommandError::UnknownCategory(key.to_string()));
    }

    println!("{}", catalog.category_label(key));
    for item in items {
        println!("{}", summary_line(item));
    }
    Ok(())
}
