//! End-to-end tests for the AlAdhan client against a local stub server
//!
//! A small axum app imitating the AlAdhan timings endpoints is started on a
//! background thread with its own runtime. The blocking client and the
//! router are then exercised from plain (non-async) tests, the same way the
//! service calls them from its blocking pool.
//!
//! Run with: cargo test --test provider_stub

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use hijri_clock::ingest::aladhan::AladhanClient;
use hijri_clock::ingest::TimingsProvider;
use hijri_clock::model::{Location, PrayerError, PrayerRequest, TimingsQuery};
use hijri_clock::router::PrayerRouter;

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

fn day_body(date: &str, maghrib: &str, isha: &str) -> Value {
    json!({
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:07", "Sunrise": "06:23", "Dhuhr": "12:28",
                "Asr": "15:53", "Maghrib": maghrib, "Isha": isha,
                "Lastthird": "02:46"
            },
            "date": {
                "readable": date,
                "hijri": {
                    "day": "05",
                    "month": {"en": "Ramaḍān"},
                    "year": "1445",
                    "weekday": {"en": "Al Juma'a"}
                }
            }
        }
    })
}

async fn timings(
    Path(date): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !params.contains_key("latitude") || !params.contains_key("method") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 400, "status": "BAD_REQUEST", "data": "Please specify a latitude."})),
        );
    }
    (StatusCode::OK, Json(day_body(&date, "18:12", "19:42")))
}

async fn timings_by_city(
    Path(date): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    match params.get("city").map(String::as_str) {
        Some("Cairo") => (StatusCode::OK, Json(day_body(&date, "17:58", "19:16"))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": 400, "status": "BAD_REQUEST", "data": "Unable to locate city."})),
        ),
    }
}

async fn broken() -> &'static str {
    "<html>502 Bad Gateway</html>"
}

async fn unavailable(Path(date): Path<String>) -> (StatusCode, Json<Value>) {
    (StatusCode::SERVICE_UNAVAILABLE, Json(day_body(&date, "18:12", "19:42")))
}

async fn slow(Path(date): Path<String>) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(day_body(&date, "18:12", "19:42"))
}

/// Start the stub on an ephemeral port and return its base URL.
fn start_stub() -> String {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let app = Router::new()
                .route("/v1/timings/{date}", get(timings))
                .route("/v1/timingsByCity/{date}", get(timings_by_city))
                .route("/broken/timings/{date}", get(broken))
                .route("/unavailable/timings/{date}", get(unavailable))
                .route("/slow/timings/{date}", get(slow));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = rx.recv_timeout(Duration::from_secs(5)).expect("stub did not start");
    format!("http://{}", addr)
}

fn coords_query() -> TimingsQuery {
    TimingsQuery {
        location: Location::Coordinates {
            latitude: 21.42,
            longitude: 39.83,
        },
        method: 4,
        date: "15-03-2024".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client tests
// ---------------------------------------------------------------------------

#[test]
fn test_client_fetches_coordinate_day() {
    let base = format!("{}/v1", start_stub());
    let client = AladhanClient::new(&base, Duration::from_secs(5)).unwrap();

    let day = client.fetch_day(&coords_query()).unwrap();
    assert_eq!(day.readable_date, "15-03-2024");
    assert_eq!(day.timing("Isha").unwrap(), "19:42");
}

#[test]
fn test_client_surfaces_city_rejection_as_upstream_error() {
    let base = format!("{}/v1", start_stub());
    let client = AladhanClient::new(&base, Duration::from_secs(5)).unwrap();
    let query = TimingsQuery {
        location: Location::City {
            city: "Atlantis".to_string(),
            country: "Nowhere".to_string(),
        },
        method: 2,
        date: "15-03-2024".to_string(),
    };

    match client.fetch_day(&query) {
        Err(PrayerError::Upstream(msg)) => assert!(msg.contains("400"), "unexpected message: {}", msg),
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[test]
fn test_client_rejects_non_json_body() {
    let base = format!("{}/broken", start_stub());
    let client = AladhanClient::new(&base, Duration::from_secs(5)).unwrap();
    assert!(matches!(client.fetch_day(&coords_query()), Err(PrayerError::Upstream(_))));
}

#[test]
fn test_client_rejects_non_2xx_even_with_success_body() {
    let base = format!("{}/unavailable", start_stub());
    let client = AladhanClient::new(&base, Duration::from_secs(5)).unwrap();

    match client.fetch_day(&coords_query()) {
        Err(PrayerError::Upstream(msg)) => assert!(msg.contains("503"), "unexpected message: {}", msg),
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[test]
fn test_client_timeout_is_upstream_error() {
    let base = format!("{}/slow", start_stub());
    let client = AladhanClient::new(&base, Duration::from_secs(1)).unwrap();

    let started = Instant::now();
    let result = client.fetch_day(&coords_query());
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(PrayerError::Upstream(_))), "got {:?}", result);
    assert!(
        elapsed < Duration::from_secs(3),
        "timeout should cut the call short, took {:?}",
        elapsed
    );
}

// ---------------------------------------------------------------------------
// Router over the real client
// ---------------------------------------------------------------------------

#[test]
fn test_router_over_stub_city_lookup() {
    let base = format!("{}/v1", start_stub());
    let client = Arc::new(AladhanClient::new(&base, Duration::from_secs(5)).unwrap());
    let router = PrayerRouter::new(client);

    let req = PrayerRequest {
        latitude: None,
        longitude: None,
        city: Some("Cairo".to_string()),
        country: Some("Egypt".to_string()),
        method: 5,
        local_date: "2024-03-15".to_string(),
    };

    let result = router.handle(&req).unwrap();
    // Maghrib 17:58 -> Isha 19:16; anchor 23:59 - 17:58 = 06:01
    assert_eq!(result.ishan, "01:18");
    assert_eq!(result.fajir, "11:08");
    assert_eq!(result.gregorian_date, "15-03-2024");
    assert_eq!(result.method, 5);
}
