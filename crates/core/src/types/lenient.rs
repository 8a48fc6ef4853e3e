//! Lenient decoding of loosely-typed catalog fields.
//!
//! Spreadsheet cells and hand-edited JSON files carry numbers as strings,
//! blank cells, and the occasional negative stock count. These helpers turn
//! any JSON value into the field's type, substituting the field default
//! (`0`, `false`, empty string) instead of failing. Prices and quantities are
//! never negative.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::id::ProductId;

/// Decode a price. Unparseable or negative input yields zero.
#[must_use]
pub fn price(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed
        .filter(|amount| !amount.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// Decode a stock quantity. Fractions are truncated; unparseable or negative
/// input yields zero.
#[must_use]
pub fn quantity(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| parse_decimal(&n.to_string()).and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| parse_decimal(s).and_then(truncate))
        }
        _ => None,
    };
    parsed
        .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Decode a boolean flag. Only JSON `true` or the text `true`
/// (any case) count as set.
#[must_use]
pub fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Decode a text field, trimmed. Scalars are rendered; null and
/// containers become the empty string.
#[must_use]
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Decode an explicit product id. Only positive integers are ids.
#[must_use]
pub fn product_id(value: &Value) -> Option<ProductId> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(ProductId::new(id))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn truncate(amount: Decimal) -> Option<i64> {
    i64::try_from(amount.trunc()).ok()
}

// =============================================================================
// Serde adapters
// =============================================================================

/// `deserialize_with` adapter for [`price`].
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().map_or(Decimal::ZERO, price))
}

/// `deserialize_with` adapter for [`quantity`].
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().map_or(0, quantity))
}

/// `deserialize_with` adapter for [`flag`].
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().is_some_and(flag))
}

/// `deserialize_with` adapter for [`text`].
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().map_or_else(String::new, text))
}
