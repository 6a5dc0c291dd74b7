//! Request routing: validate a `PrayerRequest`, pick the upstream query shape,
//! call the provider, and derive the response values.
//!
//! Everything here returns `Result<_, PrayerError>`; mapping to HTTP status
//! codes happens only in `server`.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::clock::{self, ClockTime};
use crate::ingest::TimingsProvider;
use crate::logging::{self, Component};
use crate::model::{
    DerivedResult, Location, PrayerError, PrayerRequest, ProviderDay, TimingsQuery, ASR, DHUHR,
    END_OF_DAY, FAJR, ISHA, LAST_THIRD, MAGHRIB, SUNRISE,
};

pub const INVALID_DATE_DETAIL: &str = "Invalid date format. Use YYYY-MM-DD.";
pub const MISSING_LOCATION_DETAIL: &str =
    "Either provide (latitude & longitude) OR (city & country).";

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Convert `YYYY-MM-DD` to the provider's `DD-MM-YYYY`, rejecting anything
/// that is not a real calendar day.
pub fn reformat_date(local_date: &str) -> Result<String, PrayerError> {
    let date = NaiveDate::parse_from_str(local_date, "%Y-%m-%d")
        .map_err(|_| PrayerError::InvalidInput(INVALID_DATE_DETAIL.to_string()))?;
    Ok(date.format("%d-%m-%Y").to_string())
}

/// A coordinate counts only when present and non-zero.
fn usable_coordinate(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn usable_name(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

/// Decide which location form to send upstream. Coordinates win when both
/// forms are usable.
pub fn select_location(req: &PrayerRequest) -> Result<Location, PrayerError> {
    if let (Some(latitude), Some(longitude)) =
        (usable_coordinate(req.latitude), usable_coordinate(req.longitude))
    {
        return Ok(Location::Coordinates { latitude, longitude });
    }

    if let (Some(city), Some(country)) =
        (usable_name(req.city.as_ref()), usable_name(req.country.as_ref()))
    {
        return Ok(Location::City { city, country });
    }

    Err(PrayerError::InvalidInput(MISSING_LOCATION_DETAIL.to_string()))
}

/// Validate a request into the query the provider will see.
///
/// The date is checked first, so a request with both a bad date and no
/// location reports the date.
pub fn build_query(req: &PrayerRequest) -> Result<TimingsQuery, PrayerError> {
    let date = reformat_date(&req.local_date)?;
    let location = select_location(req)?;
    Ok(TimingsQuery {
        location,
        method: req.method,
        date,
    })
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Build the response from one provider day.
///
/// The mid-night anchor is the span from Maghrib to 23:59; Lastthird, Fajr,
/// Sunrise, Dhuhr and Asr are each shifted forward by it.
pub fn derive_result(method: i64, day: &ProviderDay) -> Result<DerivedResult, PrayerError> {
    let maghrib_raw = day.timing(MAGHRIB)?;
    let maghrib = ClockTime::parse(maghrib_raw)?;
    let isha = ClockTime::parse(day.timing(ISHA)?)?;
    let anchor = clock::elapsed(maghrib, ClockTime::parse(END_OF_DAY)?);

    let shifted = |label: &str| -> Result<String, PrayerError> {
        let point = ClockTime::parse(day.timing(label)?)?;
        Ok(clock::shift(anchor, point).to_string())
    };

    Ok(DerivedResult {
        status: "success".to_string(),
        gregorian_date: day.readable_date.clone(),
        arabic_weekday: day.hijri_weekday.clone(),
        hijri_full_date: format!("{} {} {}", day.hijri_day, day.hijri_month, day.hijri_year),
        method,
        maghrib: maghrib_raw.to_string(),
        ishan: clock::elapsed(maghrib, isha).to_string(),
        last_night: shifted(LAST_THIRD)?,
        fajir: shifted(FAJR)?,
        sunrise: shifted(SUNRISE)?,
        dhuhr: shifted(DHUHR)?,
        asr: shifted(ASR)?,
        timings: day.timings.clone(),
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Stateless request handler. Built once at startup and shared.
#[derive(Clone)]
pub struct PrayerRouter {
    provider: Arc<dyn TimingsProvider>,
}

impl PrayerRouter {
    pub fn new(provider: Arc<dyn TimingsProvider>) -> Self {
        Self { provider }
    }

    /// Answer one request. Performs one blocking provider call.
    pub fn handle(&self, req: &PrayerRequest) -> Result<DerivedResult, PrayerError> {
        let query = build_query(req)?;
        let context = query.context();
        logging::debug(Component::Router, Some(&context), &format!("method {}", query.method));

        let day = self.provider.fetch_day(&query).inspect_err(|e| {
            logging::log_provider_failure(&context, "Timings lookup", e);
        })?;

        derive_result(req.method, &day).inspect_err(|e| {
            logging::error(Component::Router, Some(&context), &e.to_string());
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
