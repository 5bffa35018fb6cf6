//! WooCommerce product shape as delivered by the `wc/v3` REST API.
//!
//! ## Observed quirks
//!
//! - `price` is a decimal string, and `""` for products without a price.
//! - `manage_stock` is a bool on simple products but the string `"parent"`
//!   on variations that inherit stock handling; anything that is not `true`
//!   is treated as "not managed".
//! - `stock_quantity` is `null` whenever stock is not managed.
//! - `total_sales` has been observed both as a number and as a numeric string.
//! - `meta_data` is an ordered list of `{id, key, value}` where `value` is any
//!   JSON value. FooEvents stores its booking configuration here as a
//!   JSON-encoded *string*.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Meta keys written by the FooEvents plugins.
pub mod meta_keys {
    /// Booking plugin configuration blob (JSON string or structured value).
    pub const BOOKING_OPTIONS: &str = "fooevents_bookings_options_serialized";
    /// Single-event flag; the value `"Event"` marks a ticketed event product.
    pub const EVENT_FLAG: &str = "WooCommerceEventsEvent";
    pub const EVENT_FLAG_VALUE: &str = "Event";
    pub const EVENT_DATE: &str = "WooCommerceEventsDate";
    pub const EVENT_HOUR: &str = "WooCommerceEventsHour";
    pub const EVENT_MINUTES: &str = "WooCommerceEventsMinutes";
    pub const EVENT_PERIOD: &str = "WooCommerceEventsPeriod";
    /// Prefix shared by every FooEvents single-event meta key.
    pub const EVENT_PREFIX: &str = "WooCommerceEvents";
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub manage_stock: bool,

    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub stock_quantity: Option<i64>,

    #[serde(default)]
    pub stock_status: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_sales: i64,

    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

/// One `{key, value}` entry of a product's metadata list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl MetaEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Product {
    /// First metadata value stored under `key`.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// First metadata value under `key`, if it is a string.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta(key).and_then(Value::as_str)
    }

    /// Whether native stock tracking is on and a quantity is recorded.
    #[must_use]
    pub fn tracks_native_stock(&self) -> bool {
        self.manage_stock && self.stock_quantity.is_some()
    }

    /// Whether the product carries any FooEvents metadata at all.
    #[must_use]
    pub fn has_event_metadata(&self) -> bool {
        self.meta_data.iter().any(|entry| {
            entry.key == meta_keys::BOOKING_OPTIONS || entry.key.starts_with(meta_keys::EVENT_PREFIX)
        })
    }

    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock_status.as_deref() == Some("instock")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value).unwrap_or(0))
}

/// Reads an integer from a JSON number or a trimmed numeric string.
fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
