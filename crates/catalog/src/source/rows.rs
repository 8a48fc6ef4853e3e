//! Spreadsheet row to catalog item conversion.
//!
//! Columns are positional, in this order:
//!
//! | col | field | default when blank |
//! |---|---|---|
//! | A | id | row position + 1 |
//! | B | name | `""` |
//! | C | category | `""` |
//! | D | price | `0` |
//! | E | image | `""` |
//! | F | description | `""` |
//! | G | features (pipe-separated) | `[]` |
//! | H | quantity | `0` |
//! | I | featured | `false` |
//! | J-M | secondary images | skipped |
//!
//! Rows may be shorter than the column list; missing cells take the default.

use devpooja_core::{CatalogItem, ProductId, lenient, resolve_ids, split_features};
use serde_json::Value;
use tracing::warn;

const ID: usize = 0;
const NAME: usize = 1;
const CATEGORY: usize = 2;
const PRICE: usize = 3;
const IMAGE: usize = 4;
const DESCRIPTION: usize = 5;
const FEATURES: usize = 6;
const QUANTITY: usize = 7;
const FEATURED: usize = 8;
const SECONDARY_IMAGES: std::ops::Range<usize> = 9..13;

/// Convert one row. `index` is the zero-based position of the row in the
/// returned range and supplies the id when the id cell is blank or invalid.
#[must_use]
pub fn parse_row(index: usize, row: &[Value]) -> CatalogItem {
    let cell = |col: usize| row.get(col).unwrap_or(&Value::Null);

    let id = lenient::product_id(cell(ID)).unwrap_or_else(|| position_id(index));

    CatalogItem {
        id,
        name: lenient::text(cell(NAME)),
        category: lenient::text(cell(CATEGORY)),
        price: lenient::price(cell(PRICE)),
        quantity: lenient::quantity(cell(QUANTITY)),
        description: lenient::text(cell(DESCRIPTION)),
        features: split_features(&lenient::text(cell(FEATURES))),
        image: lenient::text(cell(IMAGE)),
        images: SECONDARY_IMAGES
            .map(|col| lenient::text(cell(col)))
            .filter(|image| !image.is_empty())
            .collect(),
        featured: lenient::flag(cell(FEATURED)),
    }
}

/// Convert every row, dropping rows whose explicit id repeats an earlier one.
///
/// Rows without a usable id never collide: when their position is already
/// claimed they take the next free id.
#[must_use]
pub fn parse_rows(rows: &[Vec<Value>]) -> Vec<CatalogItem> {
    let entries = rows
        .iter()
        .enumerate()
        .map(|(index, row)| (row.get(ID).and_then(lenient::product_id), parse_row(index, row)))
        .collect();

    let (items, dropped) = resolve_ids(entries);
    if !dropped.is_empty() {
        warn!(
            duplicate_ids = ?dropped,
            "Dropped spreadsheet rows with duplicate product ids"
        );
    }
    items
}

fn position_id(index: usize) -> ProductId {
    ProductId::new(i64::try_from(index).map_or(i64::MAX, |i| i.saturating_add(1)))
}
