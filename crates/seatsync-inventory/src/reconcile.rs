//! Capacity reconciliation.
//!
//! Booking metadata only records what is left to sell. The ticket posts in
//! the store's database record what was sold. Capacity is the sum of the two
//! and is only reported when both are known.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::booking::BookingMap;
use crate::classify::BookingShape;
use crate::sources::TicketOracle;

/// A sales-derived figure: a count, or the reason it could not be computed.
///
/// Serialized untagged, so a known figure is a plain number and an
/// unavailable one is `{"error": "..."}`. It is never a number standing in
/// for an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tally {
    Known(i64),
    Unavailable { error: String },
}

impl Tally {
    pub fn unavailable(error: impl fmt::Display) -> Self {
        Self::Unavailable {
            error: error.to_string(),
        }
    }

    #[must_use]
    pub fn known(&self) -> Option<i64> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unavailable { .. } => None,
        }
    }

    /// `available + sold` when sold is known; otherwise the same sentinel.
    #[must_use]
    pub fn capacity(available: i64, sold: &Tally) -> Tally {
        match sold {
            Self::Known(n) => Self::Known(available.saturating_add(*n)),
            Self::Unavailable { error } => Self::Unavailable {
                error: error.clone(),
            },
        }
    }
}

/// Available stock with its reconciled sales and capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub available: i64,
    pub tickets_sold: Tally,
    pub total_capacity: Tally,
}

impl Capacity {
    #[must_use]
    pub fn new(available: i64, tickets_sold: Tally) -> Self {
        let total_capacity = Tally::capacity(available, &tickets_sold);
        Self {
            available,
            tickets_sold,
            total_capacity,
        }
    }
}

/// Which ticket count applies to a product's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesScope {
    /// Count tickets tagged with the slot label and date.
    PerDate,
    /// Count every ticket of the product. Single events sold without booking
    /// tags have nothing else to match on.
    ProductTotal,
}

/// Tickets sold per `(slot id, date id)`, computed ahead of formatting.
#[derive(Debug, Clone, Default)]
pub struct SoldCounts {
    by_date: HashMap<(String, String), Tally>,
}

impl SoldCounts {
    pub fn insert(&mut self, slot_id: &str, date_id: &str, sold: Tally) {
        self.by_date
            .insert((slot_id.to_string(), date_id.to_string()), sold);
    }

    /// The recorded count; a date that was never looked up is unavailable.
    #[must_use]
    pub fn get(&self, slot_id: &str, date_id: &str) -> Tally {
        self.by_date
            .get(&(slot_id.to_string(), date_id.to_string()))
            .cloned()
            .unwrap_or_else(|| Tally::unavailable("tickets sold not looked up"))
    }
}

pub struct Reconciler<'a> {
    oracle: &'a dyn TicketOracle,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(oracle: &'a dyn TicketOracle) -> Self {
        Self { oracle }
    }

    /// Reconciles one slot/date against the tickets tagged with it.
    ///
    /// An oracle failure leaves `available` intact and turns the sales
    /// figures into the unavailable sentinel.
    pub async fn reconcile(
        &self,
        product_id: i64,
        slot_label: &str,
        date: &str,
        booking_stock: i64,
    ) -> Capacity {
        let sold = self.sold_for_date(product_id, slot_label, date).await;
        Capacity::new(booking_stock, sold)
    }

    /// Decides how a product's tickets are counted.
    ///
    /// Multi-booking products always count per date. A single event counts
    /// per date only once some of its tickets carry slot tags.
    ///
    /// # Errors
    ///
    /// Returns the sentinel to use for every date when the oracle fails.
    pub async fn scope(&self, product_id: i64, shape: BookingShape) -> Result<SalesScope, Tally> {
        if !shape.is_single_event() {
            return Ok(SalesScope::PerDate);
        }
        match self.oracle.has_slot_tickets(product_id).await {
            Ok(true) => Ok(SalesScope::PerDate),
            Ok(false) => Ok(SalesScope::ProductTotal),
            Err(e) => {
                tracing::warn!(product_id, error = %e, "could not check ticket tags");
                Err(Tally::unavailable(e))
            }
        }
    }

    /// Tickets sold for one slot/date under the product's sales scope.
    pub async fn tickets_sold(
        &self,
        product_id: i64,
        shape: BookingShape,
        slot_label: &str,
        date: &str,
    ) -> Tally {
        match self.scope(product_id, shape).await {
            Ok(SalesScope::PerDate) => self.sold_for_date(product_id, slot_label, date).await,
            Ok(SalesScope::ProductTotal) => self.sold_for_product(product_id).await,
            Err(sentinel) => sentinel,
        }
    }

    /// Tickets sold for every date of a booking map.
    pub async fn sold_counts(
        &self,
        product_id: i64,
        shape: BookingShape,
        booking: &BookingMap,
    ) -> SoldCounts {
        let mut counts = SoldCounts::default();
        let scope = self.scope(product_id, shape).await;

        let product_total = match scope {
            Ok(SalesScope::ProductTotal) => Some(self.sold_for_product(product_id).await),
            _ => None,
        };

        for slot in booking.slots() {
            for date in &slot.dates {
                let sold = match (&scope, &product_total) {
                    (Err(sentinel), _) => sentinel.clone(),
                    (Ok(_), Some(total)) => total.clone(),
                    (Ok(_), None) => self.sold_for_date(product_id, &slot.label, &date.date).await,
                };
                counts.insert(&slot.id, &date.id, sold);
            }
        }
        counts
    }

    async fn sold_for_date(&self, product_id: i64, slot_label: &str, date: &str) -> Tally {
        match self
            .oracle
            .tickets_sold_for_date(product_id, slot_label, date)
            .await
        {
            Ok(n) => Tally::Known(n),
            Err(e) => {
                tracing::warn!(product_id, slot_label, date, error = %e, "tickets sold unavailable");
                Tally::unavailable(e)
            }
        }
    }

    async fn sold_for_product(&self, product_id: i64) -> Tally {
        match self.oracle.total_tickets_for_product(product_id).await {
            Ok(n) => Tally::Known(n),
            Err(e) => {
                tracing::warn!(product_id, error = %e, "product ticket total unavailable");
                Tally::unavailable(e)
            }
        }
    }
}
