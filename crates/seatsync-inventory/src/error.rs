use seatsync_woo::WooError;
use thiserror::Error;

/// Failures of an inventory read or mutation.
///
/// Ticket-sales lookups never appear here: an unreachable database degrades
/// the affected figures to [`crate::Tally::Unavailable`] instead.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("catalog request failed: {0}")]
    Catalog(#[from] WooError),

    #[error("no event data found for product {product_id}")]
    Unclassifiable { product_id: i64 },

    #[error("both slot_id and date_id are required for product {product_id}")]
    MissingIdentifiers { product_id: i64 },

    #[error("slot {slot_id} not found in product {product_id}")]
    SlotNotFound { product_id: i64, slot_id: String },

    #[error("date {date_id} not found in slot {slot_id} for product {product_id}")]
    DateNotFound {
        product_id: i64,
        slot_id: String,
        date_id: String,
    },

    #[error("cannot decrement inventory below 0 (current: {current})")]
    BelowZero { current: i64 },

    #[error("cannot set inventory to a negative value ({requested})")]
    NegativeStock { requested: i64 },

    #[error("stock for date {date_id} in slot {slot_id} is not a number: {raw:?}")]
    MalformedStock {
        slot_id: String,
        date_id: String,
        raw: String,
    },

    #[error("no stock field for date {date_id} in slot {slot_id}")]
    UnknownStockField { slot_id: String, date_id: String },

    #[error(
        "product {product_id} no longer has slot {slot_id} / date {date_id} after the write"
    )]
    MissingAfterWrite {
        product_id: i64,
        slot_id: String,
        date_id: String,
    },

    #[error("failed to encode booking map for product {product_id}: {source}")]
    Encode {
        product_id: i64,
        #[source]
        source: serde_json::Error,
    },
}
