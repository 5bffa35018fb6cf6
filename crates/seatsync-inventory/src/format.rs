//! Display records for booking slots and dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seatsync_core::Product;

use crate::booking::{BookingDate, BookingMap, BookingSlot};
use crate::reconcile::{Capacity, SoldCounts, Tally};

/// Date format used by the booking plugin, e.g. `October 20, 2026`.
pub const BOOKING_DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedDate {
    pub date_id: String,
    pub date: String,
    /// Same figure as `available`; kept for consumers that read `stock`.
    pub stock: i64,
    pub available: i64,
    pub total_capacity: Tally,
    pub tickets_sold: Tally,
}

impl FormattedDate {
    #[must_use]
    pub fn new(date: &BookingDate, tickets_sold: Tally) -> Self {
        let capacity = Capacity::new(date.stock.available(), tickets_sold);
        Self {
            date_id: date.id.clone(),
            date: date.date.clone(),
            stock: capacity.available,
            available: capacity.available,
            total_capacity: capacity.total_capacity,
            tickets_sold: capacity.tickets_sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSlot {
    pub product_id: i64,
    pub product_name: String,
    pub slot_id: String,
    pub slot_label: String,
    pub slot_time: String,
    pub dates: Vec<FormattedDate>,
    pub total_dates: usize,
}

/// Formats every slot of a booking map, dates in calendar order.
#[must_use]
pub fn format_slots(product: &Product, booking: &BookingMap, sold: &SoldCounts) -> Vec<FormattedSlot> {
    booking
        .slots()
        .iter()
        .map(|slot| format_slot(product, slot, sold))
        .collect()
}

#[must_use]
pub fn format_slot(product: &Product, slot: &BookingSlot, sold: &SoldCounts) -> FormattedSlot {
    let dates = format_dates(slot, sold);
    FormattedSlot {
        product_id: product.id,
        product_name: product.name.clone(),
        slot_id: slot.id.clone(),
        slot_label: slot.label.clone(),
        slot_time: display_time(slot),
        total_dates: dates.len(),
        dates,
    }
}

/// A slot's dates with sales figures, sorted by calendar date.
#[must_use]
pub fn format_dates(slot: &BookingSlot, sold: &SoldCounts) -> Vec<FormattedDate> {
    let mut dates: Vec<FormattedDate> = slot
        .dates
        .iter()
        .map(|date| FormattedDate::new(date, sold.get(&slot.id, &date.id)))
        .collect();
    dates.sort_by_key(|d| sort_date(&d.date));
    dates
}

/// Calendar date used for ordering. Unparseable text maps to 1970-01-01 and
/// so sorts first.
#[must_use]
pub fn sort_date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text.trim(), BOOKING_DATE_FORMAT).unwrap_or_default()
}

/// Display time for a slot.
///
/// An explicit `period` is used verbatim. Without one the hour is converted
/// to 12-hour form, and an `am`/`pm` marker in the label decides the half of
/// the day even when the hour disagrees. An unparseable hour falls back to
/// the slot's `unformatted_time`, then `N/A`.
#[must_use]
pub fn display_time(slot: &BookingSlot) -> String {
    let hour = slot.hour.as_deref().unwrap_or("00");
    let minute = slot.minute.as_deref().unwrap_or("00");

    if let Some(period) = slot.period.as_deref().filter(|p| !p.is_empty()) {
        return format!("{hour}:{minute} {period}");
    }

    let Ok(hour_num) = hour.trim().parse::<i64>() else {
        return slot
            .unformatted_time
            .clone()
            .unwrap_or_else(|| "N/A".to_string());
    };

    let label = slot.label.to_lowercase();
    if label.contains("pm") || label.contains("p.m.") {
        match hour_num {
            12 => format!("12:{minute} p.m."),
            h if h < 12 => format!("{hour}:{minute} p.m."),
            h => format!("{:02}:{minute} p.m.", h - 12),
        }
    } else if label.contains("am") || label.contains("a.m.") {
        match hour_num {
            0 => format!("12:{minute} a.m."),
            h if h <= 12 => format!("{hour}:{minute} a.m."),
            h => format!("{:02}:{minute} a.m.", h - 12),
        }
    } else {
        match hour_num {
            0 => format!("12:{minute} a.m."),
            h if h < 12 => format!("{hour}:{minute} a.m."),
            12 => format!("12:{minute} p.m."),
            h => format!("{:02}:{minute} p.m.", h - 12),
        }
    }
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
