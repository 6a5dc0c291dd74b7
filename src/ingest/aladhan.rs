//! AlAdhan Prayer Times API Client
//!
//! Retrieves the Gregorian/Hijri date and daily prayer timings for either a
//! coordinate pair or a city/country pair.
//!
//! API Documentation: https://aladhan.com/prayer-times-api
//! Coordinate lookup:  {base}/timings/{DD-MM-YYYY}?latitude=&longitude=&method=
//! City lookup:        {base}/timingsByCity/{DD-MM-YYYY}?city=&country=&method=

use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::TimingsProvider;
use crate::logging::{self, Component};
use crate::model::{Location, PrayerError, ProviderDay, TimingsQuery};

pub const ALADHAN_BASE_URL: &str = "https://api.aladhan.com/v1";

// ============================================================================
// AlAdhan API Response Structures
// ============================================================================

/// Top-level envelope. On failure `data` is a plain string message, so it is
/// only decoded further once `code` says the call succeeded.
#[derive(Debug, Deserialize)]
pub struct AladhanEnvelope {
    pub code: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct AladhanDay {
    pub date: AladhanDate,
    pub timings: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct AladhanDate {
    pub readable: String,
    pub hijri: AladhanHijri,
}

#[derive(Debug, Deserialize)]
pub struct AladhanHijri {
    pub day: Value,   // "05" in practice, but numbers are tolerated
    pub month: AladhanName,
    pub year: Value,
    pub weekday: AladhanName,
}

#[derive(Debug, Deserialize)]
pub struct AladhanName {
    pub en: String,
}

// ============================================================================
// URL construction
// ============================================================================

/// Builds the full request URL for a query against `base_url`.
pub fn build_timings_url(base_url: &str, query: &TimingsQuery) -> Result<Url, PrayerError> {
    let base = base_url.trim_end_matches('/');
    let method = query.method.to_string();

    let parsed = match &query.location {
        Location::Coordinates { latitude, longitude } => Url::parse_with_params(
            &format!("{}/timings/{}", base, query.date),
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("method", method),
            ],
        ),
        Location::City { city, country } => Url::parse_with_params(
            &format!("{}/timingsByCity/{}", base, query.date),
            &[
                ("city", city.clone()),
                ("country", country.clone()),
                ("method", method),
            ],
        ),
    };

    parsed.map_err(|e| PrayerError::Upstream(format!("Bad provider URL: {}", e)))
}

// ============================================================================
// Response parsing
// ============================================================================

/// Renders a JSON scalar the way it would appear when interpolated into text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an AlAdhan timings response body.
///
/// Fails with `PrayerError::Upstream` when the body is not JSON, when
/// `code` is anything but 200, or when an expected field is missing.
pub fn parse_timings_response(body: &str) -> Result<ProviderDay, PrayerError> {
    let envelope: AladhanEnvelope = serde_json::from_str(body)
        .map_err(|e| PrayerError::Upstream(format!("Parse error: {}", e)))?;

    if envelope.code != 200 {
        let reason = scalar_text(&envelope.data)
            .or(envelope.status)
            .unwrap_or_default();
        return Err(PrayerError::Upstream(format!(
            "Provider rejected query: code {} {}",
            envelope.code, reason
        )));
    }

    let day: AladhanDay = serde_json::from_value(envelope.data)
        .map_err(|e| PrayerError::Upstream(format!("Parse error: {}", e)))?;

    let hijri = day.date.hijri;
    let hijri_day = scalar_text(&hijri.day)
        .ok_or_else(|| PrayerError::Upstream("Parse error: hijri.day is not a scalar".into()))?;
    let hijri_year = scalar_text(&hijri.year)
        .ok_or_else(|| PrayerError::Upstream("Parse error: hijri.year is not a scalar".into()))?;

    Ok(ProviderDay {
        readable_date: day.date.readable,
        hijri_day,
        hijri_month: hijri.month.en,
        hijri_year,
        hijri_weekday: hijri.weekday.en,
        timings: day.timings,
    })
}

// ============================================================================
// API Client
// ============================================================================

/// Blocking AlAdhan client. Build it once at startup and share it.
pub struct AladhanClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AladhanClient {
    /// Creates a client whose every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl TimingsProvider for AladhanClient {
    fn fetch_day(&self, query: &TimingsQuery) -> Result<ProviderDay, PrayerError> {
        let url = build_timings_url(&self.base_url, query)?;
        let context = query.context();
        logging::debug(Component::Aladhan, Some(&context), &format!("GET {}", url));

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| PrayerError::Upstream(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| PrayerError::Upstream(format!("Failed to read response: {}", e)))?;

        let parsed = parse_timings_response(&body);
        if status.is_success() {
            return parsed;
        }

        // Any non-2xx fails; the body only adds detail to the message.
        let detail = match parsed {
            Ok(_) => "body claimed success".to_string(),
            Err(err) => err.to_string(),
        };
        Err(PrayerError::Upstream(format!(
            "HTTP error: {} ({})",
            status.as_u16(),
            detail
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================


// ---------------------------------------------------------------------------
// Integration Tests - Live API
// ---------------------------------------------------------------------------
//
// Marked #[ignore] so normal builds don't depend on AlAdhan availability.
//
// To run these tests manually:
//   cargo test -- --ignored aladhan_live
