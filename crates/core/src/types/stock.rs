//! Stock level classification for storefront badges.

use serde::{Deserialize, Serialize};

/// Quantities at or below this are shown as "only N left".
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Stock level of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "remaining", rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing on hand; the item cannot be added to a cart.
    OutOfStock,
    /// Between 1 and [`LOW_STOCK_THRESHOLD`] units left.
    LowStock(u32),
    InStock,
}

impl StockStatus {
    /// Classify a quantity on hand.
    #[must_use]
    pub const fn from_quantity(quantity: u32) -> Self {
        match quantity {
            0 => Self::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => Self::LowStock(n),
            _ => Self::InStock,
        }
    }

    /// Whether the item can be purchased.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }

    /// Badge text shown on product cards, if any.
    #[must_use]
    pub fn badge(&self) -> Option<String> {
        match self {
            Self::OutOfStock => Some("Out of Stock".to_string()),
            Self::LowStock(n) => Some(format!("Only {n} left!")),
            Self::InStock => None,
        }
    }
}
