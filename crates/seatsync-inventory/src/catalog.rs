//! Catalog snapshot: every event product with its formatted slots.
//!
//! Products are processed one at a time. A product that cannot be fetched or
//! carries no event data is listed under `failed_products` and the snapshot
//! carries on.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::{CachePolicy, SnapshotCache};
use crate::classify::classify;
use crate::error::InventoryError;
use crate::extract::extract;
use crate::format::{format_slots, FormattedSlot, BOOKING_DATE_FORMAT};
use crate::service::InventoryService;
use crate::sources::Catalog;

/// Page size used when scanning the store for event products.
pub const DISCOVERY_PAGE_SIZE: u32 = 100;

/// Upper bound on pages scanned, in case the store never returns an empty page.
const MAX_DISCOVERY_PAGES: u32 = 500;

/// Which products a snapshot covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "product_ids", rename_all = "lowercase")]
pub enum ProductSelection {
    /// Scan the store for in-stock products carrying event metadata.
    Discover,
    /// A fixed list of product ids.
    Configured(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: i64,
    pub product_name: String,
    pub product_price: String,
    pub total_sales: i64,
    pub slots: Vec<FormattedSlot>,
    pub slot_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedProduct {
    pub product_id: i64,
    pub product_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Api,
    Cache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// The selection this snapshot was built for. A cached snapshot is only
    /// served for the same selection.
    pub selection: ProductSelection,
    pub products: Vec<ProductSummary>,
    pub failed_products: Vec<FailedProduct>,
    pub total_products: usize,
    pub failed_count: usize,
    pub total_slots: usize,
    pub total_dates: usize,
    pub last_updated: DateTime<Utc>,
    pub cache_source: SnapshotSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_age_minutes: Option<i64>,
}

/// Ids of published, in-stock products that carry event metadata.
///
/// Pages are read until an empty one. A failed page ends the scan with the
/// products found so far.
pub async fn discover_event_products(catalog: &dyn Catalog) -> Vec<i64> {
    let mut found = Vec::new();

    for page in 1..=MAX_DISCOVERY_PAGES {
        let products = match catalog.list_products_page(page, DISCOVERY_PAGE_SIZE).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(page, error = %e, "product discovery stopped early");
                break;
            }
        };
        if products.is_empty() {
            break;
        }

        for product in products {
            if !product.has_event_metadata() {
                continue;
            }
            if product.is_in_stock() {
                tracing::debug!(product_id = product.id, name = %product.name, "found event product");
                found.push(product.id);
            } else {
                tracing::debug!(
                    product_id = product.id,
                    stock_status = product.stock_status.as_deref().unwrap_or("none"),
                    "skipping out-of-stock event product"
                );
            }
        }
    }

    tracing::info!(count = found.len(), "product discovery complete");
    found
}

impl InventoryService {
    /// Builds a fresh snapshot from the store.
    pub async fn build_snapshot(&self, selection: &ProductSelection) -> CatalogSnapshot {
        let product_ids = match selection {
            ProductSelection::Discover => discover_event_products(self.catalog.as_ref()).await,
            ProductSelection::Configured(ids) => ids.clone(),
        };
        tracing::info!(count = product_ids.len(), "building catalog snapshot");

        let mut products = Vec::new();
        let mut failed_products = Vec::new();
        for product_id in product_ids {
            match self.summarize_product(product_id).await {
                Ok(summary) => products.push(summary),
                Err(failed) => {
                    tracing::warn!(product_id, error = %failed.error, "product left out of snapshot");
                    failed_products.push(failed);
                }
            }
        }

        products.sort_by_cached_key(sort_key);

        let total_slots = products.iter().map(|p| p.slot_count).sum();
        let total_dates = products
            .iter()
            .flat_map(|p| &p.slots)
            .map(|s| s.dates.len())
            .sum();

        CatalogSnapshot {
            selection: selection.clone(),
            total_products: products.len(),
            failed_count: failed_products.len(),
            products,
            failed_products,
            total_slots,
            total_dates,
            last_updated: Utc::now(),
            cache_source: SnapshotSource::Api,
            cache_age_minutes: None,
        }
    }

    /// Serves the cached snapshot while the policy allows it and it was
    /// built for the same selection, otherwise builds and caches a fresh one.
    ///
    /// Cache read and write failures are logged and never fail the call.
    pub async fn snapshot(
        &self,
        selection: &ProductSelection,
        cache: &dyn SnapshotCache,
        policy: &CachePolicy,
        force_refresh: bool,
    ) -> CatalogSnapshot {
        if !force_refresh {
            match cache.load() {
                Ok(Some(cached)) if cached.selection != *selection => {
                    tracing::info!("cached snapshot covers a different product selection");
                }
                Ok(Some(mut cached)) => {
                    let age = cache.age_of(&cached);
                    if policy.is_fresh(age) {
                        tracing::info!(
                            products = cached.total_products,
                            age_minutes = age.num_minutes(),
                            "serving cached snapshot"
                        );
                        cached.cache_source = SnapshotSource::Cache;
                        cached.cache_age_minutes = Some(age.num_minutes());
                        return cached;
                    }
                    tracing::info!(age_minutes = age.num_minutes(), "cached snapshot expired");
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "ignoring unreadable snapshot cache"),
            }
        }

        let fresh = self.build_snapshot(selection).await;
        if let Err(e) = cache.save(&fresh) {
            tracing::warn!(error = %e, "failed to save snapshot cache");
        }
        fresh
    }

    async fn summarize_product(&self, product_id: i64) -> Result<ProductSummary, FailedProduct> {
        let product = self
            .catalog
            .fetch_product(product_id)
            .await
            .map_err(|e| FailedProduct {
                product_id,
                product_name: "Unknown".to_string(),
                error: e.to_string(),
            })?;

        let failed = |error: String| FailedProduct {
            product_id,
            product_name: product.name.clone(),
            error,
        };

        let classification = classify(&product).map_err(|e| match e {
            InventoryError::Unclassifiable { .. } => failed("No FooEvents data found".to_string()),
            other => failed(other.to_string()),
        })?;
        let booking = extract(&product, &classification).map_err(|e| failed(e.to_string()))?;

        let sold = self
            .reconciler()
            .sold_counts(product_id, classification.shape, &booking)
            .await;
        let slots = format_slots(&product, &booking, &sold);
        if slots.is_empty() {
            return Err(failed("No valid slots after formatting".to_string()));
        }

        Ok(ProductSummary {
            product_id,
            product_name: product.name.clone(),
            product_price: product.price.clone(),
            total_sales: product.total_sales,
            slot_count: slots.len(),
            slots,
        })
    }
}

/// Listing order: weekly shows by weekday then hour, then everything else by
/// earliest date (or name when no date parses).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Weekly { day: u8, hour: u32 },
    Dated(String),
}

#[must_use]
pub fn sort_key(product: &ProductSummary) -> SortKey {
    let name = product.product_name.to_lowercase();
    match weekday(&name) {
        Some(day) => SortKey::Weekly {
            day,
            hour: show_hour(&name),
        },
        None => SortKey::Dated(
            earliest_date(product)
                .map_or_else(|| product.product_name.clone(), |d| d.format("%Y-%m-%d").to_string()),
        ),
    }
}

/// Weekday in a product name, Monday = 1 through Sunday = 7.
fn weekday(name: &str) -> Option<u8> {
    const DAYS: [&str; 7] = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
    if name.contains("feedback") && name.contains("open mic") {
        return Some(1);
    }
    DAYS.iter()
        .position(|day| name.contains(day))
        .and_then(|i| u8::try_from(i + 1).ok())
}

/// Evening show hour in a product name; 0 when there is none.
fn show_hour(name: &str) -> u32 {
    if name.contains("8pm") || name.contains("8 pm") {
        return 8;
    }
    if name.contains("10pm") || name.contains("10 pm") {
        return 10;
    }
    let pattern = Regex::new(r"(\d{1,2})\s*pm").expect("valid regex");
    pattern
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn earliest_date(product: &ProductSummary) -> Option<NaiveDate> {
    product
        .slots
        .iter()
        .flat_map(|s| &s.dates)
        .filter_map(|d| NaiveDate::parse_from_str(d.date.trim(), BOOKING_DATE_FORMAT).ok())
        .min()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
