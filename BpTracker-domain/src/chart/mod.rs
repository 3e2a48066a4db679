//! Chart model for the readings line chart.
//!
//! The renderer draws whatever [`ChartView`] describes; nothing here knows
//! about drawing.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::entities::Reading;
use crate::export::DATE_FORMAT;

/// Text shown instead of an empty chart
pub const NO_DATA_MESSAGE: &str = "No Data to Show";

/// One series in the chart legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

/// Systolic in red, diastolic in black
pub const LEGEND: [LegendEntry; 2] = [
    LegendEntry { key: "systolic", label: "Systolic", color: "red" },
    LegendEntry { key: "diastolic", label: "Diastolic", color: "black" },
];

/// A reading positioned on the time axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub recorded_at: DateTime<Utc>,
    /// X axis label, formatted like the export dates
    pub label: String,
    pub systolic: i32,
    pub diastolic: i32,
}

/// Non-empty chart contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    /// Lowest and highest value across both series
    pub extent: (i32, i32),
    pub legend: Vec<LegendEntry>,
    /// Whether the CSV download action is offered
    pub can_export: bool,
}

/// What the chart should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartView {
    /// Explicit empty state
    NoData,
    Series(ChartSeries),
}

impl ChartView {
    /// Build the chart for readings in UTC
    pub fn from_readings(readings: &[Reading]) -> Self {
        Self::from_readings_at(readings, Utc.fix())
    }

    /// Build the chart with axis labels in the given offset
    pub fn from_readings_at(readings: &[Reading], offset: FixedOffset) -> Self {
        if readings.is_empty() {
            return ChartView::NoData;
        }

        let mut points: Vec<ChartPoint> = readings
            .iter()
            .map(|r| ChartPoint {
                recorded_at: r.recorded_at,
                label: r.recorded_at.with_timezone(&offset).format(DATE_FORMAT).to_string(),
                systolic: r.systolic,
                diastolic: r.diastolic,
            })
            .collect();
        points.sort_by_key(|p| p.recorded_at);

        let values = points.iter().flat_map(|p| [p.systolic, p.diastolic]);
        let min = values.clone().min().unwrap_or_default();
        let max = values.max().unwrap_or_default();

        ChartView::Series(ChartSeries {
            points,
            extent: (min, max),
            legend: LEGEND.to_vec(),
            can_export: true,
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartView::NoData)
    }

    /// Message to show in place of the chart, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ChartView::NoData => Some(NO_DATA_MESSAGE),
            ChartView::Series(_) => None,
        }
    }

    pub fn can_export(&self) -> bool {
        match self {
            ChartView::NoData => false,
            ChartView::Series(series) => series.can_export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(systolic: i32, diastolic: i32, day: u32) -> Reading {
        Reading {
            id: i64::from(day),
            systolic,
            diastolic,
            recorded_at: Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_no_readings_means_no_data() {
        let view = ChartView::from_readings(&[]);
        assert!(view.is_empty());
        assert_eq!(view.message(), Some("No Data to Show"));
        assert!(!view.can_export());
    }

    #[test]
    fn test_series_points_and_extent() {
        let view = ChartView::from_readings(&[reading(135, 88, 2), reading(118, 72, 1)]);

        let ChartView::Series(series) = view else {
            panic!("expected a series");
        };
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].label, "2024-01-01:08:00");
        assert_eq!(series.points[1].systolic, 135);
        assert_eq!(series.extent, (72, 135));
        assert_eq!(series.legend[0].color, "red");
        assert_eq!(series.legend[1].label, "Diastolic");
        assert!(series.can_export);
    }
}
