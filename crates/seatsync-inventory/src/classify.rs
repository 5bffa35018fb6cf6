//! Booking-structure classification.
//!
//! Signals on a product can coexist and disagree: a product converted from a
//! multi-slot booking to a single event keeps its old booking blob. The rules
//! below run strongest signal first and the first match wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seatsync_core::{meta_keys, Product};

use crate::booking::{synthetic_slot_id, BookingMap};
use crate::error::InventoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingShape {
    /// One event tracked by the store's own stock quantity.
    SingleNativeStock,
    /// One event represented through a synthetic booking map.
    SingleSynthetic,
    /// A genuine multi-slot / multi-date booking configuration.
    MultiBooking,
}

impl BookingShape {
    #[must_use]
    pub fn is_single_event(self) -> bool {
        !matches!(self, Self::MultiBooking)
    }
}

/// Outcome of classification: the shape plus the decoded booking blob, if
/// the product carried a readable one.
#[derive(Debug, Clone)]
pub struct Classification {
    pub shape: BookingShape,
    pub blob: Option<BookingMap>,
}

/// What the rules look at: the product and its booking blob, decoded once.
pub(crate) struct Signals<'a> {
    pub(crate) product: &'a Product,
    pub(crate) blob: Option<BookingMap>,
}

type Rule = fn(&Signals<'_>) -> Option<BookingShape>;

/// Ordered classification rules.
pub(crate) const RULES: [(&str, Rule); 4] = [
    ("native_stock", native_stock),
    ("multi_booking", multi_booking),
    ("event_flag", event_flag),
    ("synthetic_blob", synthetic_blob),
];

/// Classifies a product's booking structure.
///
/// # Errors
///
/// Returns [`InventoryError::Unclassifiable`] when no rule matches. Callers
/// treat that as "no event data" and never pick a shape on their own.
pub fn classify(product: &Product) -> Result<Classification, InventoryError> {
    let signals = Signals {
        product,
        blob: decode_booking_blob(product),
    };

    for (name, rule) in RULES {
        if let Some(shape) = rule(&signals) {
            tracing::debug!(product_id = product.id, rule = name, ?shape, "classified product");
            return Ok(Classification {
                shape,
                blob: signals.blob,
            });
        }
    }

    tracing::warn!(product_id = product.id, name = %product.name, "no booking rule matched");
    Err(InventoryError::Unclassifiable {
        product_id: product.id,
    })
}

/// Decodes the booking blob, which may be a JSON string or structured JSON.
///
/// Parse failures are logged and read as "no blob"; the event-flag rule may
/// still classify the product.
pub(crate) fn decode_booking_blob(product: &Product) -> Option<BookingMap> {
    match product.meta(meta_keys::BOOKING_OPTIONS)? {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => match BookingMap::from_json_str(text) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(product_id = product.id, error = %e, "unparseable booking options");
                None
            }
        },
        other => BookingMap::from_value(other.clone()),
    }
}

fn native_stock(signals: &Signals<'_>) -> Option<BookingShape> {
    signals
        .product
        .tracks_native_stock()
        .then_some(BookingShape::SingleNativeStock)
}

fn multi_booking(signals: &Signals<'_>) -> Option<BookingShape> {
    let blob = signals.blob.as_ref()?;
    let slots = blob.slots();
    let multi = match slots {
        [] => false,
        [only] => only.id != synthetic_slot_id(signals.product.id) && only.dates.len() > 1,
        _ => true,
    };
    multi.then_some(BookingShape::MultiBooking)
}

fn event_flag(signals: &Signals<'_>) -> Option<BookingShape> {
    (signals.product.meta_str(meta_keys::EVENT_FLAG) == Some(meta_keys::EVENT_FLAG_VALUE))
        .then_some(BookingShape::SingleSynthetic)
}

fn synthetic_blob(signals: &Signals<'_>) -> Option<BookingShape> {
    signals
        .blob
        .as_ref()
        .filter(|blob| blob.is_synthetic_for(signals.product.id))
        .map(|_| BookingShape::SingleSynthetic)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
