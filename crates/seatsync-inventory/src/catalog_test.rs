use async_trait::async_trait;
use seatsync_core::{meta_keys, MetaEntry, Product};
use seatsync_woo::WooError;

use super::*;
use crate::format::FormattedDate;
use crate::reconcile::Tally;
use crate::test_support::{product, with_event_flag, with_meta};

/// Serves fixed pages; a `None` page fails.
struct PagedCatalog {
    pages: Vec<Option<Vec<Product>>>,
}

#[async_trait]
impl Catalog for PagedCatalog {
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WooError> {
        Err(WooError::ProductNotFound { product_id })
    }

    async fn patch_product_metadata(&self, _: i64, _: &[MetaEntry]) -> Result<(), WooError> {
        unreachable!("discovery never writes")
    }

    async fn patch_product_stock(&self, _: i64, _: i64) -> Result<(), WooError> {
        unreachable!("discovery never writes")
    }

    async fn list_products_page(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        assert_eq!(per_page, DISCOVERY_PAGE_SIZE);
        let index = usize::try_from(page - 1).unwrap();
        match self.pages.get(index) {
            Some(Some(products)) => Ok(products.clone()),
            Some(None) => Err(WooError::UnexpectedStatus {
                status: 500,
                url: "http://store.test/wp-json/wc/v3/products".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn out_of_stock(mut p: Product) -> Product {
    p.stock_status = Some("outofstock".to_string());
    p
}

fn summary(name: &str, dates: &[&str]) -> ProductSummary {
    let dates: Vec<FormattedDate> = dates
        .iter()
        .enumerate()
        .map(|(i, date)| FormattedDate {
            date_id: format!("d{i}"),
            date: (*date).to_string(),
            stock: 1,
            available: 1,
            total_capacity: Tally::Known(1),
            tickets_sold: Tally::Known(0),
        })
        .collect();
    ProductSummary {
        product_id: 1,
        product_name: name.to_string(),
        product_price: "20.00".to_string(),
        total_sales: 0,
        slots: vec![FormattedSlot {
            product_id: 1,
            product_name: name.to_string(),
            slot_id: "s".to_string(),
            slot_label: "Show".to_string(),
            slot_time: "N/A".to_string(),
            total_dates: dates.len(),
            dates,
        }],
        slot_count: 1,
    }
}

#[tokio::test]
async fn discovery_keeps_in_stock_event_products() {
    let catalog = PagedCatalog {
        pages: vec![
            Some(vec![
                with_event_flag(product(1, "Event")),
                product(2, "T-Shirt"),
                out_of_stock(with_event_flag(product(3, "Sold Out"))),
            ]),
            Some(vec![with_meta(
                product(4, "Bookings"),
                meta_keys::BOOKING_OPTIONS,
                "{}",
            )]),
        ],
    };
    assert_eq!(discover_event_products(&catalog).await, vec![1, 4]);
}

#[tokio::test]
async fn discovery_stops_at_failed_page() {
    let catalog = PagedCatalog {
        pages: vec![
            Some(vec![with_event_flag(product(1, "Event"))]),
            None,
            Some(vec![with_event_flag(product(3, "Never Reached"))]),
        ],
    };
    assert_eq!(discover_event_products(&catalog).await, vec![1]);
}

#[test]
fn weekday_reads_product_name() {
    assert_eq!(weekday("thursday night comedy"), Some(4));
    assert_eq!(weekday("sunday 6pm"), Some(7));
    assert_eq!(weekday("feedback: an open mic"), Some(1));
    assert_eq!(weekday("feedback workshop"), None);
    assert_eq!(weekday("new year's eve"), None);
}

#[test]
fn show_hour_reads_pm_times() {
    assert_eq!(show_hour("friday 8pm"), 8);
    assert_eq!(show_hour("friday 10 pm late show"), 10);
    assert_eq!(show_hour("saturday 9pm"), 9);
    assert_eq!(show_hour("saturday 6 pm"), 6);
    assert_eq!(show_hour("saturday matinee"), 0);
}

#[test]
fn weekly_shows_sort_before_dated_products() {
    let mut products = vec![
        summary("Holiday Special", &["December 20, 2026"]),
        summary("Saturday 10pm", &[]),
        summary("Fall Gala", &["October 3, 2026", "TBD"]),
        summary("Saturday 8pm", &[]),
        summary("Tuesday Open Mic", &[]),
        summary("Mystery Night", &["TBD"]),
    ];
    products.sort_by_cached_key(sort_key);

    let names: Vec<&str> = products.iter().map(|p| p.product_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Tuesday Open Mic",
            "Saturday 8pm",
            "Saturday 10pm",
            "Fall Gala",
            "Holiday Special",
            "Mystery Night",
        ]
    );
}

#[test]
fn dated_key_uses_earliest_parseable_date() {
    assert_eq!(
        sort_key(&summary("Gala", &["November 2, 2026", "TBD", "October 3, 2026"])),
        SortKey::Dated("2026-10-03".to_string())
    );
    assert_eq!(
        sort_key(&summary("Gala", &["TBD"])),
        SortKey::Dated("Gala".to_string())
    );
}

#[test]
fn snapshot_source_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(SnapshotSource::Cache).unwrap(),
        serde_json::json!("cache")
    );
}

#[test]
fn selection_is_recorded_with_its_ids() {
    assert_eq!(
        serde_json::to_value(ProductSelection::Configured(vec![4060, 77])).unwrap(),
        serde_json::json!({ "mode": "configured", "product_ids": [4060, 77] })
    );
    assert_eq!(
        serde_json::to_value(ProductSelection::Discover).unwrap(),
        serde_json::json!({ "mode": "discover" })
    );
}
