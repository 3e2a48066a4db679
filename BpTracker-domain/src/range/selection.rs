use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::resolver::RangeError;

/// Trailing windows offered by the preset toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PresetDays {
    #[default]
    Thirty,
    Sixty,
    Ninety,
}

impl PresetDays {
    /// Every preset, in toggle order
    pub const ALL: [PresetDays; 3] = [PresetDays::Thirty, PresetDays::Sixty, PresetDays::Ninety];

    /// Number of days covered by the window
    pub fn days(self) -> i64 {
        match self {
            PresetDays::Thirty => 30,
            PresetDays::Sixty => 60,
            PresetDays::Ninety => 90,
        }
    }

    /// Length of the window
    pub fn duration(self) -> Duration {
        Duration::days(self.days())
    }
}

impl fmt::Display for PresetDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for PresetDays {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30" => Ok(PresetDays::Thirty),
            "60" => Ok(PresetDays::Sixty),
            "90" => Ok(PresetDays::Ninety),
            other => Err(RangeError::UnknownPreset(other.to_string())),
        }
    }
}

/// What the user has picked for the chart range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSelection {
    /// Trailing window ending now
    Preset(PresetDays),
    /// Explicit inclusive date pair
    Custom { from: NaiveDate, to: NaiveDate },
    /// Nothing complete selected yet; fetching is suppressed
    Empty,
}

impl Default for RangeSelection {
    fn default() -> Self {
        RangeSelection::Preset(PresetDays::default())
    }
}

impl RangeSelection {
    /// Active preset, if any
    pub fn preset(&self) -> Option<PresetDays> {
        match self {
            RangeSelection::Preset(days) => Some(*days),
            _ => None,
        }
    }

    /// Active custom dates, if any
    pub fn custom(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            RangeSelection::Custom { from, to } => Some((*from, *to)),
            _ => None,
        }
    }
}

/// Dates picked in a range calendar. Either endpoint may still be missing
/// while the user is mid-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CustomRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from: Some(from), to: Some(to) }
    }

    /// Only the first endpoint picked
    pub fn starting(from: NaiveDate) -> Self {
        Self { from: Some(from), to: None }
    }
}

/// Latest date the custom range calendar lets the user pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarBound {
    #[default]
    Today,
    Tomorrow,
}

impl CalendarBound {
    /// Last selectable date given today's date
    pub fn last_selectable(self, today: NaiveDate) -> NaiveDate {
        match self {
            CalendarBound::Today => today,
            CalendarBound::Tomorrow => today.succ_opt().unwrap_or(today),
        }
    }

    /// Whether a calendar should let the user pick `date`
    pub fn is_selectable(self, date: NaiveDate, today: NaiveDate) -> bool {
        date <= self.last_selectable(today)
    }
}

impl FromStr for CalendarBound {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(CalendarBound::Today),
            "tomorrow" => Ok(CalendarBound::Tomorrow),
            other => Err(RangeError::UnknownCalendarBound(other.to_string())),
        }
    }
}
