//! Canonical booking model.
//!
//! The booking plugin stores per-date stock in two shapes, sometimes both at
//! once on the same slot:
//!
//! - nested: `"add_date": { "<dateId>": { "date": "...", "stock": "12" } }`
//! - flat: `"<dateId>_add_date": "..."` and `"<dateId>_stock": "12"` directly
//!   on the slot object
//!
//! [`BookingMap`] resolves both into one list of slots and dates and
//! remembers which field each date's stock came from, so a write touches
//! exactly that field. The flat field wins when both exist: it is the one the
//! store's admin screen writes. Nothing outside this module looks at raw key
//! suffixes.

use serde_json::{Map, Value};

use seatsync_core::{meta_keys, MetaEntry};

use crate::error::InventoryError;

const NESTED_DATES_KEY: &str = "add_date";
const FLAT_DATE_SUFFIX: &str = "_add_date";
const FLAT_STOCK_SUFFIX: &str = "_stock";

/// Date text reported for a date entry that carries none.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Slot id used for a single-event product, e.g. `event_4060`.
#[must_use]
pub fn synthetic_slot_id(product_id: i64) -> String {
    format!("event_{product_id}")
}

/// Date id used for a single-event product, e.g. `date_4060`.
#[must_use]
pub fn synthetic_date_id(product_id: i64) -> String {
    format!("date_{product_id}")
}

/// A stock figure as read from booking metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockValue {
    Count(i64),
    /// Present but not an integer. Reads report 0; writes refuse it.
    Malformed(String),
}

impl StockValue {
    /// Reads a stock value. Empty strings count as 0.
    #[must_use]
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Self::Count(0);
                }
                trimmed
                    .parse::<i64>()
                    .map_or_else(|_| Self::Malformed(s.clone()), Self::Count)
            }
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Malformed(n.to_string()), Self::Count),
            other => Self::Malformed(other.to_string()),
        }
    }

    /// The figure to display: the count, or 0 when malformed.
    #[must_use]
    pub fn available(&self) -> i64 {
        match self {
            Self::Count(n) => *n,
            Self::Malformed(_) => 0,
        }
    }
}

/// Which raw field holds a date's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLocation {
    /// `<dateId>_stock` on the slot object.
    Flat,
    /// `add_date.<dateId>.stock`.
    Nested,
    /// Neither field exists.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDate {
    pub id: String,
    pub date: String,
    pub stock: StockValue,
    pub location: StockLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSlot {
    pub id: String,
    pub label: String,
    pub hour: Option<String>,
    pub minute: Option<String>,
    pub period: Option<String>,
    pub unformatted_time: Option<String>,
    pub dates: Vec<BookingDate>,
}

impl BookingSlot {
    #[must_use]
    pub fn date(&self, date_id: &str) -> Option<&BookingDate> {
        self.dates.iter().find(|d| d.id == date_id)
    }
}

/// A decoded booking configuration: the raw map, kept for write-back, plus
/// its canonical reading.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingMap {
    raw: Map<String, Value>,
    slots: Vec<BookingSlot>,
}

impl BookingMap {
    /// Decodes a booking blob that is already JSON. Returns `None` for
    /// anything but a non-empty object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) if !raw.is_empty() => Some(Self::from_raw(raw)),
            _ => None,
        }
    }

    /// Decodes a booking blob stored as a JSON-encoded string.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `text` is not JSON.
    pub fn from_json_str(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    #[must_use]
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let slots = raw
            .iter()
            .filter_map(|(id, value)| match value {
                Value::Object(fields) => Some(read_slot(id, fields)),
                _ => {
                    tracing::warn!(slot_id = %id, "skipping booking slot that is not an object");
                    None
                }
            })
            .collect();
        Self { raw, slots }
    }

    #[must_use]
    pub fn slots(&self) -> &[BookingSlot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, slot_id: &str) -> Option<&BookingSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    #[must_use]
    pub fn date_count(&self) -> usize {
        self.slots.iter().map(|s| s.dates.len()).sum()
    }

    /// Whether this is exactly the single-event map written for `product_id`:
    /// one slot `event_N` carrying `date_N_add_date` and `date_N_stock`.
    #[must_use]
    pub fn is_synthetic_for(&self, product_id: i64) -> bool {
        if self.raw.len() != 1 {
            return false;
        }
        let date_id = synthetic_date_id(product_id);
        self.raw
            .get(&synthetic_slot_id(product_id))
            .and_then(Value::as_object)
            .is_some_and(|slot| {
                slot.contains_key(&format!("{date_id}{FLAT_DATE_SUFFIX}"))
                    && slot.contains_key(&format!("{date_id}{FLAT_STOCK_SUFFIX}"))
            })
    }

    /// Overwrites one date's stock in the field it was read from.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownStockField`] if the date has no stock
    /// field. A new field is never invented.
    pub fn set_stock(
        &mut self,
        slot_id: &str,
        date_id: &str,
        stock: i64,
    ) -> Result<(), InventoryError> {
        let unknown = || InventoryError::UnknownStockField {
            slot_id: slot_id.to_string(),
            date_id: date_id.to_string(),
        };

        let date = self
            .slots
            .iter_mut()
            .find(|s| s.id == slot_id)
            .and_then(|s| s.dates.iter_mut().find(|d| d.id == date_id))
            .ok_or_else(unknown)?;

        let slot_fields = self
            .raw
            .get_mut(slot_id)
            .and_then(Value::as_object_mut)
            .ok_or_else(unknown)?;

        let field = match date.location {
            StockLocation::Flat => slot_fields.get_mut(&format!("{date_id}{FLAT_STOCK_SUFFIX}")),
            StockLocation::Nested => slot_fields
                .get_mut(NESTED_DATES_KEY)
                .and_then(|dates| dates.get_mut(date_id))
                .and_then(|entry| entry.get_mut("stock")),
            StockLocation::Absent => None,
        }
        .ok_or_else(unknown)?;

        *field = Value::String(stock.to_string());
        date.stock = StockValue::Count(stock);
        Ok(())
    }

    /// The raw map as it will be written back.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// The metadata entry that stores this map: the whole map encoded as a
    /// JSON string under the booking options key.
    ///
    /// # Errors
    ///
    /// Returns the serialization error, which only a non-string map key
    /// could cause.
    pub fn to_meta_entry(&self) -> Result<MetaEntry, serde_json::Error> {
        let encoded = serde_json::to_string(&self.raw)?;
        Ok(MetaEntry::new(meta_keys::BOOKING_OPTIONS, encoded))
    }
}

fn read_slot(id: &str, fields: &Map<String, Value>) -> BookingSlot {
    let nested = fields.get(NESTED_DATES_KEY).and_then(Value::as_object);

    let mut date_ids: Vec<String> = nested
        .map(|dates| {
            dates
                .iter()
                .filter(|(_, entry)| entry.is_object())
                .map(|(date_id, _)| date_id.clone())
                .collect()
        })
        .unwrap_or_default();

    for key in fields.keys() {
        if let Some(date_id) = key.strip_suffix(FLAT_DATE_SUFFIX) {
            if !date_id.is_empty() && !date_ids.iter().any(|d| d == date_id) {
                date_ids.push(date_id.to_string());
            }
        }
    }

    let dates = date_ids
        .into_iter()
        .map(|date_id| {
            let nested_entry = nested.and_then(|dates| dates.get(&date_id));
            let flat_date = fields.get(&format!("{date_id}{FLAT_DATE_SUFFIX}"));
            let flat_stock = fields.get(&format!("{date_id}{FLAT_STOCK_SUFFIX}"));
            let nested_stock = nested_entry.and_then(|entry| entry.get("stock"));

            let date = flat_date
                .and_then(text)
                .or_else(|| nested_entry.and_then(|e| e.get("date")).and_then(text))
                .unwrap_or_else(|| UNKNOWN_DATE.to_string());

            let (stock, location) = match (flat_stock, nested_stock) {
                (Some(value), _) => (StockValue::parse(value), StockLocation::Flat),
                (None, Some(value)) => (StockValue::parse(value), StockLocation::Nested),
                (None, None) => (StockValue::Count(0), StockLocation::Absent),
            };

            BookingDate {
                id: date_id,
                date,
                stock,
                location,
            }
        })
        .collect();

    BookingSlot {
        id: id.to_string(),
        label: fields
            .get("label")
            .and_then(text)
            .unwrap_or_else(|| "Unnamed Slot".to_string()),
        hour: fields.get("hour").and_then(text),
        minute: fields.get("minute").and_then(text),
        period: fields.get("period").and_then(text),
        unformatted_time: fields.get("unformatted_time").and_then(text),
        dates,
    }
}

/// Strings as-is, numbers in decimal; anything else is absent.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
