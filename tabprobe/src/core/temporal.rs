//! Date and duration decoding for fractional-day values.
//!
//! Hosts store date-times as days since 1899-12-30 (the spreadsheet epoch)
//! and durations as fractional days.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch of 1899-12-30T00:00:00Z.
pub const BASE_DATE_MS: i64 = -2_209_161_600_000;

pub const S_PER_DAY: i64 = 24 * 3600;
pub const MS_PER_DAY: i64 = S_PER_DAY * 1000;

const MS_PER_DAY_F: f64 = MS_PER_DAY as f64;

/// Decodes days since 1899-12-30 into a UTC date-time.
///
/// With `date_only` the input is truncated toward zero to whole days first;
/// otherwise the full value is rounded to the nearest millisecond. Returns
/// `None` for non-finite or unrepresentable input.
///
/// # Examples
///
/// ```rust
/// use tabprobe::core::temporal::decode_date;
///
/// let dt = decode_date(45_000.5, false).unwrap();
/// assert_eq!(dt.to_rfc3339(), "2023-03-15T12:00:00+00:00");
///
/// let day = decode_date(45_000.5, true).unwrap();
/// assert_eq!(day.to_rfc3339(), "2023-03-15T00:00:00+00:00");
/// ```
pub fn decode_date(days_since_epoch: f64, date_only: bool) -> Option<DateTime<Utc>> {
    if !days_since_epoch.is_finite() {
        return None;
    }
    let offset = if date_only {
        MS_PER_DAY_F * days_since_epoch.trunc()
    } else {
        (MS_PER_DAY_F * days_since_epoch).round()
    };
    // Keeps the cast below in range; chrono rejects far smaller magnitudes anyway
    if offset.abs() > 1e17 {
        return None;
    }
    let ms = BASE_DATE_MS.checked_add(offset as i64)?;
    DateTime::from_timestamp_millis(ms)
}

/// A fractional-day value split into calendar units.
///
/// All fields are absent for an undefined input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedDuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milliseconds: Option<i64>,
}

impl DecodedDuration {
    /// Builds a fully populated duration.
    pub fn new(days: i64, hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        Self {
            days: Some(days),
            hours: Some(hours),
            minutes: Some(minutes),
            seconds: Some(seconds),
            milliseconds: Some(milliseconds),
        }
    }

    /// Returns true when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reassembles the total number of milliseconds; absent fields count as zero.
    ///
    /// `None` when the total does not fit in an `i64`.
    pub fn total_milliseconds(&self) -> Option<i64> {
        let units = [
            (self.days, MS_PER_DAY),
            (self.hours, 3_600_000),
            (self.minutes, 60_000),
            (self.seconds, 1000),
            (self.milliseconds, 1),
        ];
        units.iter().try_fold(0i64, |total, (amount, scale)| {
            amount.unwrap_or(0).checked_mul(*scale)?.checked_add(total)
        })
    }
}

/// Splits fractional days into days, hours, minutes, seconds and milliseconds.
///
/// `days` is the floor of the input, so negative values borrow a whole day:
/// `-0.25` decodes to days −1, hours 18. `None`, non-finite input and inputs
/// whose day count does not fit in an `i64` decode to an empty struct.
///
/// # Examples
///
/// ```rust
/// use tabprobe::core::temporal::{decode_duration, DecodedDuration};
///
/// assert_eq!(decode_duration(Some(1.5)), DecodedDuration::new(1, 12, 0, 0, 0));
/// assert!(decode_duration(None).is_empty());
/// ```
pub fn decode_duration(fractional_days: Option<f64>) -> DecodedDuration {
    let value = match fractional_days {
        Some(v) if v.is_finite() => v,
        _ => return DecodedDuration::default(),
    };

    let days = value.floor();
    if days < i64::MIN as f64 || days >= i64::MAX as f64 {
        return DecodedDuration::default();
    }
    let remaining_ms = ((value - days) * MS_PER_DAY_F).round() as i64;
    let remaining_seconds = remaining_ms / 1000;
    let remaining_minutes = remaining_seconds / 60;

    DecodedDuration::new(
        days as i64,
        remaining_minutes / 60,
        remaining_minutes % 60,
        remaining_seconds % 60,
        remaining_ms % 1000,
    )
}

/// Renders a duration in short form, e.g. `3 d 2 h 15 min`.
///
/// Zero units are omitted, an all-zero duration renders as `0 s` and an empty
/// one as the empty string.
pub fn format_duration_short(duration: &DecodedDuration) -> String {
    if duration.is_empty() {
        return String::new();
    }
    let units = [
        (duration.days, "d"),
        (duration.hours, "h"),
        (duration.minutes, "min"),
        (duration.seconds, "s"),
        (duration.milliseconds, "ms"),
    ];
    let parts: Vec<String> = units
        .iter()
        .filter_map(|(amount, unit)| match amount {
            Some(n) if *n != 0 => Some(format!("{n} {unit}")),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "0 s".to_string()
    } else {
        parts.join(" ")
    }
}
