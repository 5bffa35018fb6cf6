//! Inventory reads and mutations.
//!
//! A mutation runs validate, classify, locate field, check bounds, write,
//! re-fetch, reconcile, respond. Any failure stops it there and nothing is
//! retried. There is no lock and no version check around the
//! read-modify-write: two concurrent mutations of the same date can both
//! read the same old value, and the later write wins.

use std::sync::Arc;

use serde::Serialize;

use seatsync_core::Product;

use crate::booking::{synthetic_date_id, synthetic_slot_id, BookingMap, StockValue};
use crate::classify::{classify, BookingShape, Classification};
use crate::error::InventoryError;
use crate::extract::extract;
use crate::format::{display_time, format_dates, format_slots, FormattedDate, FormattedSlot};
use crate::reconcile::{Capacity, Reconciler, Tally};
use crate::sources::{Catalog, TicketOracle};

/// Inventory engine over a catalog and a ticket oracle.
#[derive(Clone)]
pub struct InventoryService {
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) oracle: Arc<dyn TicketOracle>,
}

/// A stock change requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Increment,
    Decrement,
    Set(i64),
}

impl StockChange {
    /// New stock from the current one.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::BelowZero`] when decrementing from 0 or less,
    /// and [`InventoryError::NegativeStock`] for a negative target.
    pub fn apply(self, current: i64) -> Result<i64, InventoryError> {
        match self {
            Self::Increment => Ok(current.saturating_add(1)),
            Self::Decrement if current <= 0 => Err(InventoryError::BelowZero { current }),
            Self::Decrement => Ok(current - 1),
            Self::Set(requested) if requested < 0 => {
                Err(InventoryError::NegativeStock { requested })
            }
            Self::Set(requested) => Ok(requested),
        }
    }
}

/// Result of [`InventoryService::get_inventory`], narrowed by the ids given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InventoryView {
    Product(ProductInventory),
    Slot(SlotInventory),
    Date(DateInventory),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInventory {
    pub product_id: i64,
    pub product_name: String,
    pub shape: BookingShape,
    pub slots: Vec<FormattedSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInventory {
    pub product_id: i64,
    pub product_name: String,
    pub shape: BookingShape,
    pub slot_id: String,
    pub slot_label: String,
    pub slot_time: String,
    pub dates: Vec<FormattedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateInventory {
    pub product_id: i64,
    pub product_name: String,
    pub shape: BookingShape,
    pub slot_id: String,
    pub slot_label: String,
    pub date_id: String,
    pub date: String,
    pub stock: i64,
    pub available: i64,
    pub total_capacity: Tally,
    pub tickets_sold: Tally,
}

/// Confirmed outcome of a mutation, read back from the store after writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub product_id: i64,
    pub product_name: String,
    pub shape: BookingShape,
    pub slot_id: String,
    pub slot_label: String,
    pub date_id: String,
    pub date: String,
    pub old_stock: i64,
    pub new_stock: i64,
    /// Same as `new_stock`.
    pub stock: i64,
    /// Same as `new_stock`.
    pub available: i64,
    pub old_total_capacity: Tally,
    pub total_capacity: Tally,
    pub tickets_sold: Tally,
}

/// A product decoded through classification and extraction.
struct Decoded {
    product: Product,
    classification: Classification,
    booking: BookingMap,
}

impl Decoded {
    fn shape(&self) -> BookingShape {
        self.classification.shape
    }
}

impl InventoryService {
    pub fn new(catalog: Arc<dyn Catalog>, oracle: Arc<dyn TicketOracle>) -> Self {
        Self { catalog, oracle }
    }

    pub(crate) fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self.oracle.as_ref())
    }

    /// Reads inventory for a product, one slot, or one date.
    ///
    /// An unknown slot id widens the view to the whole product, and an
    /// unknown date id to the whole slot.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Catalog`] if the product cannot be fetched
    /// and [`InventoryError::Unclassifiable`] if it has no event data.
    pub async fn get_inventory(
        &self,
        product_id: i64,
        slot_id: Option<&str>,
        date_id: Option<&str>,
    ) -> Result<InventoryView, InventoryError> {
        let decoded = self.load(product_id).await?;
        let shape = decoded.shape();
        let product = &decoded.product;
        let reconciler = self.reconciler();

        let Some(slot) = slot_id.and_then(|id| decoded.booking.slot(id)) else {
            if let Some(id) = slot_id {
                tracing::debug!(product_id, slot_id = id, "unknown slot; returning all slots");
            }
            let sold = reconciler.sold_counts(product_id, shape, &decoded.booking).await;
            return Ok(InventoryView::Product(ProductInventory {
                product_id,
                product_name: product.name.clone(),
                shape,
                slots: format_slots(product, &decoded.booking, &sold),
            }));
        };

        if let Some(date) = date_id.and_then(|id| slot.date(id)) {
            let sold = reconciler
                .tickets_sold(product_id, shape, &slot.label, &date.date)
                .await;
            let formatted = FormattedDate::new(date, sold);
            return Ok(InventoryView::Date(DateInventory {
                product_id,
                product_name: product.name.clone(),
                shape,
                slot_id: slot.id.clone(),
                slot_label: slot.label.clone(),
                date_id: formatted.date_id,
                date: formatted.date,
                stock: formatted.stock,
                available: formatted.available,
                total_capacity: formatted.total_capacity,
                tickets_sold: formatted.tickets_sold,
            }));
        }

        let sold = reconciler.sold_counts(product_id, shape, &decoded.booking).await;
        Ok(InventoryView::Slot(SlotInventory {
            product_id,
            product_name: product.name.clone(),
            shape,
            slot_id: slot.id.clone(),
            slot_label: slot.label.clone(),
            slot_time: display_time(slot),
            dates: format_dates(slot, &sold),
        }))
    }

    /// Adds one ticket to a date's stock.
    ///
    /// # Errors
    ///
    /// See [`InventoryService::apply_change`].
    pub async fn increment(
        &self,
        product_id: i64,
        slot_id: Option<&str>,
        date_id: Option<&str>,
    ) -> Result<MutationOutcome, InventoryError> {
        self.apply_change(product_id, slot_id, date_id, StockChange::Increment)
            .await
    }

    /// Removes one ticket from a date's stock. Fails without writing at 0.
    ///
    /// # Errors
    ///
    /// See [`InventoryService::apply_change`].
    pub async fn decrement(
        &self,
        product_id: i64,
        slot_id: Option<&str>,
        date_id: Option<&str>,
    ) -> Result<MutationOutcome, InventoryError> {
        self.apply_change(product_id, slot_id, date_id, StockChange::Decrement)
            .await
    }

    /// Sets a date's stock to `value`. Fails without writing when negative.
    ///
    /// # Errors
    ///
    /// See [`InventoryService::apply_change`].
    pub async fn set_to(
        &self,
        product_id: i64,
        slot_id: Option<&str>,
        date_id: Option<&str>,
        value: i64,
    ) -> Result<MutationOutcome, InventoryError> {
        self.apply_change(product_id, slot_id, date_id, StockChange::Set(value))
            .await
    }

    /// Applies a stock change with exactly one write to the catalog.
    ///
    /// `slot_id` and `date_id` may be omitted only for a product whose
    /// booking map is its own single-event map.
    ///
    /// # Errors
    ///
    /// Fails before writing on a fetch error, an unclassifiable product,
    /// missing or unknown ids, a stock value that is not a number or has no
    /// field, or a bounds violation. Fails after writing if the write itself
    /// fails, or if the re-fetched product no longer has the date.
    pub async fn apply_change(
        &self,
        product_id: i64,
        slot_id: Option<&str>,
        date_id: Option<&str>,
        change: StockChange,
    ) -> Result<MutationOutcome, InventoryError> {
        let mut decoded = self.load(product_id).await?;
        let shape = decoded.shape();
        let (slot_id, date_id) = resolve_ids(&decoded.booking, product_id, slot_id, date_id)?;

        let old_stock = locate_stock(&decoded.booking, product_id, &slot_id, &date_id)?;
        let new_stock = change.apply(old_stock)?;

        tracing::info!(
            product_id,
            slot_id = %slot_id,
            date_id = %date_id,
            ?shape,
            ?change,
            old_stock,
            new_stock,
            "writing inventory change"
        );

        match shape {
            BookingShape::SingleNativeStock => {
                self.catalog.patch_product_stock(product_id, new_stock).await?;
            }
            BookingShape::SingleSynthetic | BookingShape::MultiBooking => {
                decoded.booking.set_stock(&slot_id, &date_id, new_stock)?;
                let entry = decoded
                    .booking
                    .to_meta_entry()
                    .map_err(|source| InventoryError::Encode { product_id, source })?;
                self.catalog
                    .patch_product_metadata(product_id, &[entry])
                    .await?;
            }
        }

        let confirmed = self.load(product_id).await?;
        let missing = || InventoryError::MissingAfterWrite {
            product_id,
            slot_id: slot_id.clone(),
            date_id: date_id.clone(),
        };
        let slot = confirmed.booking.slot(&slot_id).ok_or_else(missing)?;
        let date = slot.date(&date_id).ok_or_else(missing)?;
        let confirmed_stock = match &date.stock {
            StockValue::Count(n) => *n,
            StockValue::Malformed(raw) => {
                return Err(InventoryError::MalformedStock {
                    slot_id: slot_id.clone(),
                    date_id: date_id.clone(),
                    raw: raw.clone(),
                })
            }
        };
        if confirmed_stock != new_stock {
            tracing::warn!(
                product_id,
                requested = new_stock,
                confirmed = confirmed_stock,
                "store reports a different stock than was written"
            );
        }

        let sold = self
            .reconciler()
            .tickets_sold(product_id, confirmed.shape(), &slot.label, &date.date)
            .await;
        let before = Capacity::new(old_stock, sold.clone());
        let after = Capacity::new(confirmed_stock, sold);

        Ok(MutationOutcome {
            product_id,
            product_name: confirmed.product.name.clone(),
            shape: confirmed.shape(),
            slot_id: slot.id.clone(),
            slot_label: slot.label.clone(),
            date_id: date.id.clone(),
            date: date.date.clone(),
            old_stock,
            new_stock: confirmed_stock,
            stock: confirmed_stock,
            available: confirmed_stock,
            old_total_capacity: before.total_capacity,
            total_capacity: after.total_capacity,
            tickets_sold: after.tickets_sold,
        })
    }

    /// Fetches, classifies and extracts a product.
    async fn load(&self, product_id: i64) -> Result<Decoded, InventoryError> {
        let product = self.catalog.fetch_product(product_id).await?;
        let classification = classify(&product)?;
        let booking = extract(&product, &classification)?;
        Ok(Decoded {
            product,
            classification,
            booking,
        })
    }
}

/// Fills in omitted ids for a product's own single-event map.
fn resolve_ids(
    booking: &BookingMap,
    product_id: i64,
    slot_id: Option<&str>,
    date_id: Option<&str>,
) -> Result<(String, String), InventoryError> {
    match (slot_id, date_id) {
        (Some(slot), Some(date)) => Ok((slot.to_string(), date.to_string())),
        (slot, date) if booking.is_synthetic_for(product_id) => Ok((
            slot.map_or_else(|| synthetic_slot_id(product_id), str::to_string),
            date.map_or_else(|| synthetic_date_id(product_id), str::to_string),
        )),
        _ => Err(InventoryError::MissingIdentifiers { product_id }),
    }
}

/// Current stock of the date, which must exist and hold a number.
fn locate_stock(
    booking: &BookingMap,
    product_id: i64,
    slot_id: &str,
    date_id: &str,
) -> Result<i64, InventoryError> {
    let slot = booking
        .slot(slot_id)
        .ok_or_else(|| InventoryError::SlotNotFound {
            product_id,
            slot_id: slot_id.to_string(),
        })?;
    let date = slot
        .date(date_id)
        .ok_or_else(|| InventoryError::DateNotFound {
            product_id,
            slot_id: slot_id.to_string(),
            date_id: date_id.to_string(),
        })?;

    match &date.stock {
        StockValue::Count(n) => Ok(*n),
        StockValue::Malformed(raw) => Err(InventoryError::MalformedStock {
            slot_id: slot_id.to_string(),
            date_id: date_id.to_string(),
            raw: raw.clone(),
        }),
    }
}
