//! Wall-clock arithmetic over the `HH:MM` strings returned by the timings
//! provider.
//!
//! A `ClockTime` has no date and no timezone. Every operation here works
//! within a single nominal day and wraps modulo 24:00, so a difference or a
//! sum that would leave the day comes back in at the other end.

use chrono::{NaiveTime, TimeDelta, Timelike};
use std::fmt;
use std::str::FromStr;

const MINUTES_PER_DAY: i64 = 24 * 60;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A clock string could not be read as a 24-hour `HH:MM` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockError {
    pub input: String,
    pub reason: &'static str,
}

impl ClockError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid clock time '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ClockError {}

// ---------------------------------------------------------------------------
// ClockTime
// ---------------------------------------------------------------------------

/// A time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Builds a clock time from its components. Returns `None` outside
    /// 00:00..=23:59.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Builds a clock time from a minute count, wrapping modulo one day.
    pub fn from_minutes(minutes: i64) -> Self {
        let wrapped = minutes.rem_euclid(MINUTES_PER_DAY);
        Self(NaiveTime::MIN + TimeDelta::minutes(wrapped))
    }

    /// Parses a 24-hour clock string.
    ///
    /// Accepts `H:MM` and `HH:MM`. The provider occasionally appends a
    /// timezone note (`"05:12 (+03)"`); a single parenthesised suffix is
    /// ignored, any other trailing text is an error.
    pub fn parse(input: &str) -> Result<Self, ClockError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ClockError::new(input, "empty time string"));
        }

        let clock = match trimmed.split_once(char::is_whitespace) {
            None => trimmed,
            Some((clock, note)) => {
                let note = note.trim();
                let bracketed = note.len() >= 2 && note.starts_with('(') && note.ends_with(')');
                if !bracketed || note[1..note.len() - 1].contains(['(', ')']) {
                    return Err(ClockError::new(input, "unexpected text after HH:MM"));
                }
                clock
            }
        };

        let (h_str, m_str) = clock
            .split_once(':')
            .ok_or_else(|| ClockError::new(input, "expected HH:MM"))?;

        if !(1..=2).contains(&h_str.len()) || !h_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClockError::new(input, "hour must be 1 or 2 digits"));
        }
        if m_str.len() != 2 || !m_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClockError::new(input, "minute must be 2 digits"));
        }

        let hour: u32 = h_str
            .parse()
            .map_err(|_| ClockError::new(input, "hour is not a number"))?;
        let minute: u32 = m_str
            .parse()
            .map_err(|_| ClockError::new(input, "minute is not a number"))?;

        if hour > 23 {
            return Err(ClockError::new(input, "hour must be between 0 and 23"));
        }
        if minute > 59 {
            return Err(ClockError::new(input, "minute must be between 0 and 59"));
        }

        Self::from_hm(hour, minute).ok_or_else(|| ClockError::new(input, "out of range"))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since 00:00.
    pub fn minutes_of_day(&self) -> i64 {
        i64::from(self.hour() * 60 + self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Elapsed time from `from` to `to` on the same nominal day.
///
/// When `to` is earlier than `from` the interval is taken to cross midnight
/// and 24:00 is added, so the result is always in 00:00..=23:59.
pub fn elapsed(from: ClockTime, to: ClockTime) -> ClockTime {
    let delta = to.0.signed_duration_since(from.0);
    ClockTime::from_minutes(delta.num_minutes())
}

/// `point` shifted forward by `offset`, where `offset` is read as a
/// magnitude (hours and minutes) rather than a time of day.
pub fn shift(offset: ClockTime, point: ClockTime) -> ClockTime {
    let (shifted, _) = point
        .0
        .overflowing_add_signed(TimeDelta::minutes(offset.minutes_of_day()));
    ClockTime(shifted)
}

/// String form of [`elapsed`]: `"HH:MM"` from `a` to `b`.
pub fn duration(a: &str, b: &str) -> Result<String, ClockError> {
    Ok(elapsed(ClockTime::parse(a)?, ClockTime::parse(b)?).to_string())
}

/// String form of [`shift`]: `addend` moved forward by the offset `base`.
pub fn add_clock(base: &str, addend: &str) -> Result<String, ClockError> {
    Ok(shift(ClockTime::parse(base)?, ClockTime::parse(addend)?).to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_padded_and_unpadded_hours() {
        assert_eq!(ClockTime::parse("04:30"), Ok(ClockTime::from_hm(4, 30).unwrap()));
        assert_eq!(ClockTime::parse("4:30"), Ok(ClockTime::from_hm(4, 30).unwrap()));
        assert_eq!(ClockTime::parse("00:00"), Ok(ClockTime::from_hm(0, 0).unwrap()));
        assert_eq!(ClockTime::parse("23:59"), Ok(ClockTime::from_hm(23, 59).unwrap()));
    }

    #[test]
    fn test_parse_ignores_timezone_annotation() {
        let t = ClockTime::parse("05:12 (+03)").unwrap();
        assert_eq!(t.to_string(), "05:12");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in ["", "   ", "0430", "04:3", "04:300", "123:00", "ab:cd", "24:00", "12:60", "-1:30", "04-30", "05:12 junk", "05:12 (+03) junk", "05:12 ()x"] {
            assert!(ClockTime::parse(bad).is_err(), "'{}' should not parse", bad);
        }
    }

    #[test]
    fn test_parse_error_names_the_input() {
        let err = ClockTime::parse("25:00").unwrap_err();
        assert_eq!(err.input, "25:00");
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn test_from_minutes_wraps_both_directions() {
        assert_eq!(ClockTime::from_minutes(0).to_string(), "00:00");
        assert_eq!(ClockTime::from_minutes(1440).to_string(), "00:00");
        assert_eq!(ClockTime::from_minutes(1500).to_string(), "01:00");
        assert_eq!(ClockTime::from_minutes(-90).to_string(), "22:30");
    }

    #[test]
    fn test_duration_forward() {
        assert_eq!(duration("18:00", "19:30").unwrap(), "01:30");
        assert_eq!(duration("18:12", "19:42").unwrap(), "01:30");
        assert_eq!(duration("18:12", "23:59").unwrap(), "05:47");
    }

    #[test]
    fn test_duration_same_time_is_zero() {
        assert_eq!(duration("12:00", "12:00").unwrap(), "00:00");
    }

    #[test]
    fn test_duration_backwards_wraps_across_midnight() {
        assert_eq!(duration("19:30", "18:00").unwrap(), "22:30");
        assert_eq!(duration("23:00", "00:30").unwrap(), "01:30");
    }

    #[test]
    fn test_add_clock() {
        assert_eq!(add_clock("00:15", "04:30").unwrap(), "04:45");
        assert_eq!(add_clock("05:47", "12:10").unwrap(), "17:57");
        assert_eq!(add_clock("00:00", "09:09").unwrap(), "09:09");
    }

    #[test]
    fn test_add_clock_wraps_across_midnight() {
        assert_eq!(add_clock("00:30", "23:50").unwrap(), "00:20");
        assert_eq!(add_clock("23:59", "23:59").unwrap(), "23:58");
    }

    #[test]
    fn test_operations_reject_bad_operands() {
        assert!(duration("18:00", "7pm").is_err());
        assert!(add_clock("x", "04:30").is_err());
    }
}
