//! Ticket inventory engine for FooEvents products.
//!
//! Classifies a product's booking structure, reads its loosely-typed booking
//! metadata into one slot/date model, reconciles remaining stock against
//! tickets sold, and applies stock changes back to the store.

mod booking;
pub mod cache;
pub mod catalog;
mod classify;
mod error;
mod extract;
mod format;
mod reconcile;
mod service;
mod sources;

#[cfg(test)]
mod test_support;

pub use booking::{
    synthetic_date_id, synthetic_slot_id, BookingDate, BookingMap, BookingSlot, StockLocation,
    StockValue, UNKNOWN_DATE,
};
pub use cache::{cache_info, CacheError, CacheInfo, CachePolicy, FileSnapshotCache, SnapshotCache};
pub use catalog::{
    discover_event_products, CatalogSnapshot, FailedProduct, ProductSelection, ProductSummary,
    SnapshotSource,
};
pub use classify::{classify, BookingShape, Classification};
pub use error::InventoryError;
pub use extract::{extract, synthesize, UNMANAGED_STOCK};
pub use format::{display_time, format_slots, FormattedDate, FormattedSlot, BOOKING_DATE_FORMAT};
pub use reconcile::{Capacity, Reconciler, SalesScope, SoldCounts, Tally};
pub use service::{
    DateInventory, InventoryService, InventoryView, MutationOutcome, ProductInventory,
    SlotInventory, StockChange,
};
pub use sources::{Catalog, TicketOracle, UnavailableOracle};
