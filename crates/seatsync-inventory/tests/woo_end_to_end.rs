//! Mutations through `WooClient` against a mocked WooCommerce REST API.

use std::sync::Arc;

use seatsync_inventory::{BookingShape, InventoryService, UnavailableOracle};
use seatsync_woo::WooClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn native_event(quantity: i64) -> Value {
    json!({
        "id": 4060,
        "name": "Thursday 8pm",
        "price": "20.00",
        "manage_stock": true,
        "stock_quantity": quantity,
        "stock_status": "instock",
        "total_sales": 14,
        "meta_data": [
            { "id": 1, "key": "WooCommerceEventsEvent", "value": "Event" },
            { "id": 2, "key": "WooCommerceEventsDate", "value": "October 22, 2026" }
        ]
    })
}

fn service(server: &MockServer) -> InventoryService {
    let client = WooClient::with_base_url(&server.uri(), "ck_test", "cs_test", 5)
        .expect("client construction should not fail");
    InventoryService::new(Arc::new(client), Arc::new(UnavailableOracle))
}

#[tokio::test]
async fn increment_writes_stock_and_reports_refetched_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(5)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .and(query_param("consumer_key", "ck_test"))
        .and(body_json(json!({ "stock_quantity": 6, "manage_stock": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(6)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(6)))
        .mount(&server)
        .await;

    let outcome = service(&server)
        .increment(4060, None, None)
        .await
        .expect("increment should succeed");

    assert_eq!(outcome.shape, BookingShape::SingleNativeStock);
    assert_eq!(outcome.old_stock, 5);
    assert_eq!(outcome.new_stock, 6);
    assert_eq!(outcome.date, "October 22, 2026");
    assert!(outcome.total_capacity.known().is_none());
}

#[tokio::test]
async fn outcome_reports_refetched_stock_not_requested_stock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(5)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .and(body_json(json!({ "stock_quantity": 6, "manage_stock": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(4)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(4)))
        .mount(&server)
        .await;

    let outcome = service(&server)
        .increment(4060, None, None)
        .await
        .expect("increment should succeed");

    assert_eq!(outcome.old_stock, 5);
    assert_eq!(outcome.new_stock, 4);
    assert_eq!(outcome.available, 4);
}

#[tokio::test]
async fn metadata_write_posts_serialized_booking_map() {
    let server = MockServer::start().await;
    let blob = json!({
        "a": { "label": "Early", "add_date": { "d": { "date": "October 1, 2026", "stock": "2" } } },
        "b": { "label": "Late", "add_date": { "d": { "date": "October 1, 2026", "stock": "7" } } }
    });
    let written = json!({
        "a": { "label": "Early", "add_date": { "d": { "date": "October 1, 2026", "stock": "3" } } },
        "b": { "label": "Late", "add_date": { "d": { "date": "October 1, 2026", "stock": "7" } } }
    });
    let product = |blob: &Value| {
        json!({
            "id": 77,
            "name": "Two Shows",
            "manage_stock": false,
            "stock_status": "instock",
            "meta_data": [
                { "id": 9, "key": "fooevents_bookings_options_serialized", "value": blob.to_string() }
            ]
        })
    };

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(&blob)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/77"))
        .and(body_json(json!({
            "meta_data": [
                { "key": "fooevents_bookings_options_serialized", "value": written.to_string() }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(&written)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(&written)))
        .mount(&server)
        .await;

    let outcome = service(&server)
        .increment(77, Some("a"), Some("d"))
        .await
        .expect("increment should succeed");

    assert_eq!(outcome.shape, BookingShape::MultiBooking);
    assert_eq!((outcome.old_stock, outcome.new_stock), (2, 3));
    assert_eq!(outcome.slot_label, "Early");
}

#[tokio::test]
async fn write_failure_stops_before_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(200).set_body_json(native_event(5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/4060"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = service(&server).decrement(4060, None, None).await;
    assert!(result.is_err());
}
