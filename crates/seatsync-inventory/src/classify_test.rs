use serde_json::json;

use super::*;
use crate::test_support::{product, with_blob, with_event_flag, with_meta, with_native_stock};

fn two_slot_blob() -> Value {
    json!({
        "slot_a": {
            "label": "8pm Show",
            "add_date": {
                "a1": { "date": "October 20, 2026", "stock": "10" },
                "a2": { "date": "October 27, 2026", "stock": "10" }
            }
        },
        "slot_b": {
            "label": "10pm Show",
            "add_date": {
                "b1": { "date": "October 20, 2026", "stock": "8" },
                "b2": { "date": "October 27, 2026", "stock": "8" }
            }
        }
    })
}

fn synthetic_blob_for(id: i64) -> Value {
    json!({
        format!("event_{id}"): {
            "label": "Special Show",
            "hour": "20",
            "minute": "00",
            "period": "",
            "add_time": "enabled",
            format!("date_{id}_add_date"): "December 1, 2026",
            format!("date_{id}_stock"): "25"
        }
    })
}

#[test]
fn rule_order_is_strongest_first() {
    let names: Vec<&str> = RULES.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec!["native_stock", "multi_booking", "event_flag", "synthetic_blob"]
    );
}

#[test]
fn native_stock_wins_over_multi_booking_blob() {
    let p = with_native_stock(with_blob(product(1, "Converted"), &two_slot_blob()), 5);
    let c = classify(&p).unwrap();
    assert_eq!(c.shape, BookingShape::SingleNativeStock);
}

#[test]
fn managed_stock_without_quantity_is_not_native() {
    let mut p = with_blob(product(1, "Weekly"), &two_slot_blob());
    p.manage_stock = true;
    assert_eq!(classify(&p).unwrap().shape, BookingShape::MultiBooking);
}

#[test]
fn two_slots_is_multi_booking_even_with_event_flag() {
    let p = with_event_flag(with_blob(product(2, "Weekly"), &two_slot_blob()));
    let c = classify(&p).unwrap();
    assert_eq!(c.shape, BookingShape::MultiBooking);
    assert_eq!(c.blob.unwrap().slots().len(), 2);
}

#[test]
fn single_non_synthetic_slot_with_many_dates_is_multi_booking() {
    let blob = json!({
        "slot_a": {
            "label": "Sunday 6pm",
            "x_add_date": "October 25, 2026",
            "x_stock": "4",
            "y_add_date": "November 1, 2026",
            "y_stock": "4"
        }
    });
    let p = with_blob(product(3, "Sunday"), &blob);
    assert_eq!(classify(&p).unwrap().shape, BookingShape::MultiBooking);
}

#[test]
fn event_flag_with_stale_single_date_blob_is_synthetic() {
    let blob = json!({
        "old_slot": { "label": "Old", "add_date": { "d": { "date": "May 1, 2024", "stock": "3" } } }
    });
    let p = with_event_flag(with_blob(product(4, "One Night Only"), &blob));
    assert_eq!(classify(&p).unwrap().shape, BookingShape::SingleSynthetic);
}

#[test]
fn event_flag_alone_is_synthetic() {
    let p = with_event_flag(product(5, "Special"));
    let c = classify(&p).unwrap();
    assert_eq!(c.shape, BookingShape::SingleSynthetic);
    assert!(c.blob.is_none());
}

#[test]
fn own_synthetic_blob_is_recognized_without_flag() {
    let p = with_blob(product(6, "Special"), &synthetic_blob_for(6));
    let c = classify(&p).unwrap();
    assert_eq!(c.shape, BookingShape::SingleSynthetic);
    assert!(c.blob.unwrap().is_synthetic_for(6));
}

#[test]
fn synthetic_blob_of_another_product_is_unclassifiable() {
    let p = with_blob(product(7, "Copied"), &synthetic_blob_for(6));
    assert!(matches!(
        classify(&p),
        Err(InventoryError::Unclassifiable { product_id: 7 })
    ));
}

#[test]
fn unparseable_blob_falls_through_to_event_flag() {
    let p = with_event_flag(with_meta(
        product(8, "Broken"),
        meta_keys::BOOKING_OPTIONS,
        "{not json",
    ));
    assert_eq!(classify(&p).unwrap().shape, BookingShape::SingleSynthetic);
}

#[test]
fn unparseable_blob_without_flag_is_an_error_not_empty_data() {
    let p = with_meta(product(9, "Broken"), meta_keys::BOOKING_OPTIONS, "{not json");
    assert!(matches!(
        classify(&p),
        Err(InventoryError::Unclassifiable { product_id: 9 })
    ));
}

#[test]
fn structured_blob_value_is_accepted() {
    let p = with_meta(product(10, "Weekly"), meta_keys::BOOKING_OPTIONS, two_slot_blob());
    assert_eq!(classify(&p).unwrap().shape, BookingShape::MultiBooking);
}

#[test]
fn plain_product_is_unclassifiable() {
    assert!(classify(&product(11, "T-Shirt")).is_err());
}

#[test]
fn shape_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(BookingShape::SingleNativeStock).unwrap(),
        json!("single_native_stock")
    );
    assert!(BookingShape::SingleSynthetic.is_single_event());
    assert!(!BookingShape::MultiBooking.is_single_event());
}
