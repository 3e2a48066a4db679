use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::selection::{PresetDays, RangeSelection};

/// Date format used for custom range endpoints
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Range errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Neither an RFC 3339 timestamp nor a YYYY-MM-DD date
    #[error("Invalid date '{0}': expected an RFC 3339 timestamp or YYYY-MM-DD")]
    InvalidDate(String),

    /// Start after end
    #[error("Start date {start} is after end date {end}")]
    Reversed { start: String, end: String },

    /// Preset other than 30, 60 or 90
    #[error("Unknown preset '{0}': expected 30, 60 or 90")]
    UnknownPreset(String),

    /// Calendar bound other than today or tomorrow
    #[error("Unknown calendar bound '{0}': expected today or tomorrow")]
    UnknownCalendarBound(String),
}

/// Concrete start/end strings used to fetch and display readings.
///
/// Doubles as the fetch key: two selections that resolve to the same strings
/// share cached data. Both strings empty means nothing should be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRange {
    pub start_date: String,
    pub end_date: String,
}

impl ResolvedRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// The "not ready" range
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether both endpoints are present
    pub fn is_ready(&self) -> bool {
        !self.start_date.is_empty() && !self.end_date.is_empty()
    }

    /// Parsed endpoints, or `None` when the range is not ready
    pub fn bounds(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, RangeError> {
        if !self.is_ready() {
            return Ok(None);
        }
        let start = parse_bound(&self.start_date, BoundSide::Start)?;
        let end = parse_bound(&self.end_date, BoundSide::End)?;
        Ok(Some((start, end)))
    }
}

/// Resolve a selection into concrete range strings.
///
/// Presets become RFC 3339 timestamps ending at `now`; custom ranges keep
/// their dates verbatim.
pub fn resolve(selection: &RangeSelection, now: DateTime<Utc>) -> ResolvedRange {
    match selection {
        RangeSelection::Preset(days) => ResolvedRange::new(
            format_timestamp(now - days.duration()),
            format_timestamp(now),
        ),
        RangeSelection::Custom { from, to } => ResolvedRange::new(
            from.format(DATE_FORMAT).to_string(),
            to.format(DATE_FORMAT).to_string(),
        ),
        RangeSelection::Empty => ResolvedRange::empty(),
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Which end of a range a bound belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Start,
    End,
}

/// Parse a range bound.
///
/// Accepts RFC 3339 timestamps or plain dates. A plain date covers its whole
/// day: start bounds begin at midnight UTC and end bounds stop at
/// 23:59:59.999 UTC.
pub fn parse_bound(text: &str, side: BoundSide) -> Result<DateTime<Utc>, RangeError> {
    let text = text.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| RangeError::InvalidDate(text.to_string()))?;
    let naive = match side {
        BoundSide::Start => date.and_hms_milli_opt(0, 0, 0, 0),
        BoundSide::End => date.and_hms_milli_opt(23, 59, 59, 999),
    }
    .ok_or_else(|| RangeError::InvalidDate(text.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Bounds for an API query. Missing or blank parameters fall back to the
/// default 30 day window ending at `now`.
pub fn bounds_from_params(
    start_date: Option<&str>,
    end_date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), RangeError> {
    let start = match non_blank(start_date) {
        Some(text) => parse_bound(text, BoundSide::Start)?,
        None => now - PresetDays::default().duration(),
    };
    let end = match non_blank(end_date) {
        Some(text) => parse_bound(text, BoundSide::End)?,
        None => now,
    };

    if start > end {
        return Err(RangeError::Reversed {
            start: format_timestamp(start),
            end: format_timestamp(end),
        });
    }

    Ok((start, end))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
