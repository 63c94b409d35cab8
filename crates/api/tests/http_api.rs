//! Integration tests for the HTTP surface: landing page, scrape endpoint,
//! health check and general middleware behaviour.

mod common;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::{body_json, body_text, build_test_app, get};
use mget_collector::registry::Registry;
use mget_core::types::{SensorKind, SeriesKey};

fn populated_registry() -> Arc<Registry> {
    let registry = Arc::new(Registry::new().unwrap());
    registry.ensure_main("A");
    registry.ensure_main("B");
    registry.set_main("A", 47.0);

    let iopx = registry.ensure_series(&SeriesKey::new("A", "iopx", SensorKind::Temperature), 90.0);
    registry.set_value(&iopx, 45.0);
    let vdd = registry.ensure_series(&SeriesKey::new("A", "vdd", SensorKind::Voltage), 1.05);
    registry.set_value(&vdd, 0.85);
    registry
}

// ---------------------------------------------------------------------------
// Test: GET / returns the HTML landing page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_page_links_to_metrics() {
    let app = build_test_app(populated_registry(), &["A", "B"]);
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "got {content_type}");

    let body = body_text(response).await;
    assert!(body.contains("mget_exporter"));
    assert!(body.contains(r#"<a href="/metrics">/metrics</a>"#));
}

// ---------------------------------------------------------------------------
// Test: GET /metrics exposes every series exactly once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metrics_endpoint_renders_all_series() {
    let app = build_test_app(populated_registry(), &["A", "B"]);
    let response = get(app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "got {content_type}");

    let body = body_text(response).await;
    assert!(body.contains(r#"mget_temp{device="A"} 47"#));
    assert!(body.contains(r#"mget_temp{device="B"} 0"#));
    assert!(body.contains(
        r#"mget_thermal_diode_temp_celsius{device="A",diode="iopx",threshold="90"} 45"#
    ));
    assert!(body.contains(
        r#"mget_thermal_diode_voltage_volts{device="A",diode="vdd",threshold="1"} 0.85"#
    ));
    assert_eq!(body.matches(r#"diode="iopx""#).count(), 1);
}

// ---------------------------------------------------------------------------
// Test: exposition order is stable between scrapes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metrics_output_is_deterministic() {
    let registry = populated_registry();
    let first = body_text(get(build_test_app(Arc::clone(&registry), &["A"]), "/metrics").await).await;
    let second = body_text(get(build_test_app(registry, &["A"]), "/metrics").await).await;
    assert_eq!(first, second);

    let temp_pos = first.find("mget_temp{").unwrap();
    let diode_pos = first.find("mget_thermal_diode_temp_celsius{").unwrap();
    let volt_pos = first.find("mget_thermal_diode_voltage_volts{").unwrap();
    assert!(temp_pos < diode_pos && diode_pos < volt_pos);
}

// ---------------------------------------------------------------------------
// Test: GET /health reports devices and series counts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_counts() {
    let app = build_test_app(populated_registry(), &["A", "B"]);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["devices"], 2);
    assert_eq!(json["series"], 2);
}

// ---------------------------------------------------------------------------
// Test: unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(populated_registry(), &["A"]);
    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = build_test_app(populated_registry(), &["A"]);
    let response = get(app, "/metrics").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
