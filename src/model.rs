//! PrayerRequest, TimingsQuery, ProviderDay, DerivedResult, PrayerError
//!
//! Core data types for the Hijri clock service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no I/O; the only logic is the error-to-message mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::ClockError;

// ---------------------------------------------------------------------------
// Timing labels
// ---------------------------------------------------------------------------

pub const FAJR: &str = "Fajr";
pub const SUNRISE: &str = "Sunrise";
pub const DHUHR: &str = "Dhuhr";
pub const ASR: &str = "Asr";
pub const MAGHRIB: &str = "Maghrib";
pub const ISHA: &str = "Isha";
pub const LAST_THIRD: &str = "Lastthird";

/// Fixed end-of-day operand for the mid-night anchor.
pub const END_OF_DAY: &str = "23:59";

// ---------------------------------------------------------------------------
// Inbound request
// ---------------------------------------------------------------------------

/// Body of `POST /get_prayer_times`.
///
/// Either the coordinate pair or the city/country pair must be usable; the
/// router decides which one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerRequest {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub method: i64,
    pub local_date: String, // "YYYY-MM-DD"
}

// ---------------------------------------------------------------------------
// Upstream query
// ---------------------------------------------------------------------------

/// Which upstream endpoint shape to use.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates { latitude: f64, longitude: f64 },
    City { city: String, country: String },
}

/// A fully validated upstream query.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingsQuery {
    pub location: Location,
    pub method: i64,
    pub date: String, // "DD-MM-YYYY", the provider's path format
}

impl TimingsQuery {
    /// Short label used as log context, e.g. `coords@15-03-2024`.
    pub fn context(&self) -> String {
        let mode = match self.location {
            Location::Coordinates { .. } => "coords",
            Location::City { .. } => "city",
        };
        format!("{}@{}", mode, self.date)
    }
}

/// The fields of one provider day the service actually uses.
///
/// `timings` is kept as the raw JSON object so it can be handed back to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDay {
    pub readable_date: String,
    pub hijri_day: String,
    pub hijri_month: String,
    pub hijri_year: String,
    pub hijri_weekday: String,
    pub timings: Map<String, Value>,
}

impl ProviderDay {
    /// Looks up a timing label, failing if it is absent or not a string.
    pub fn timing(&self, label: &str) -> Result<&str, PrayerError> {
        self.timings
            .get(label)
            .and_then(Value::as_str)
            .ok_or_else(|| PrayerError::Upstream(format!("missing timing '{}'", label)))
    }
}

// ---------------------------------------------------------------------------
// Outbound response
// ---------------------------------------------------------------------------

/// Response payload for a successful lookup. Field names are part of the
/// public wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub status: String,
    pub gregorian_date: String,
    pub arabic_weekday: String,
    pub hijri_full_date: String,
    pub method: i64,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    pub ishan: String,
    pub last_night: String,
    pub fajir: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "FDhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    pub timings: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

pub const UPSTREAM_DETAIL: &str = "Invalid request or API error";

/// Everything that can go wrong while answering a prayer-times request.
#[derive(Debug, Clone, PartialEq)]
pub enum PrayerError {
    /// Bad date, or no usable location in the request.
    InvalidInput(String),
    /// The provider was unreachable, rejected the query, or sent a body
    /// without the expected fields.
    Upstream(String),
    /// A clock string from the provider was not `HH:MM`.
    Format(ClockError),
}

impl PrayerError {
    /// Message returned to the caller. Upstream causes are logged, not
    /// exposed.
    pub fn detail(&self) -> String {
        match self {
            PrayerError::InvalidInput(msg) => msg.clone(),
            PrayerError::Upstream(_) => UPSTREAM_DETAIL.to_string(),
            PrayerError::Format(err) => err.to_string(),
        }
    }
}

impl std::fmt::Display for PrayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrayerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PrayerError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            PrayerError::Format(err) => write!(f, "Format error: {}", err),
        }
    }
}

impl std::error::Error for PrayerError {}

impl From<ClockError> for PrayerError {
    fn from(err: ClockError) -> Self {
        PrayerError::Format(err)
    }
}
