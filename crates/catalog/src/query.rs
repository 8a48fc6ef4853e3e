//! Read-side lookups over a loaded catalog.
//!
//! These back the storefront pages: product detail, category listings, the
//! featured strip and the "related products" row.

use devpooja_core::{Catalog, CatalogItem, ProductId, StockStatus};

/// Number of related items shown on a product page.
pub const DEFAULT_RELATED_LIMIT: usize = 6;

/// Lookups over a [`Catalog`]. Results keep catalog order.
pub trait CatalogQuery {
    /// Item with the given id.
    fn product(&self, id: ProductId) -> Option<&CatalogItem>;

    /// Items whose category key equals `key`.
    fn by_category<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CatalogItem> + 'a;

    /// Items flagged as featured.
    fn featured(&self) -> impl Iterator<Item = &CatalogItem>;

    /// Up to `limit` other items in the same category as `item`.
    fn related<'a>(&'a self, item: &'a CatalogItem, limit: usize) -> Vec<&'a CatalogItem>;

    /// Display label for a category key, the key itself when unmapped.
    fn category_label<'a>(&'a self, key: &'a str) -> &'a str;

    /// Stock level of the item with the given id.
    fn stock_status(&self, id: ProductId) -> Option<StockStatus>;
}

impl CatalogQuery for Catalog {
    fn product(&self, id: ProductId) -> Option<&CatalogItem> {
        self.products.iter().find(|item| item.id == id)
    }

    fn by_category<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a CatalogItem> + 'a {
        self.products.iter().filter(move |item| item.category == key)
    }

    fn featured(&self) -> impl Iterator<Item = &CatalogItem> {
        self.products.iter().filter(|item| item.featured)
    }

    fn related<'a>(&'a self, item: &'a CatalogItem, limit: usize) -> Vec<&'a CatalogItem> {
        self.by_category(&item.category)
            .filter(|other| other.id != item.id)
            .take(limit)
            .collect()
    }

    fn category_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.categories.label(key)
    }

    fn stock_status(&self, id: ProductId) -> Option<StockStatus> {
        self.product(id).map(CatalogItem::stock_status)
    }
}
