//! Reporting and dashboard models

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// One calendar-day bucket of movement activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSeriesPoint {
    pub date: NaiveDate,
    pub stock_in: i64,
    pub stock_out: i64,
}

/// Expand sparse per-day counts into a dense series covering the trailing
/// window ending at `end` (inclusive).
///
/// Days with no activity appear with zero counts so chart rendering never
/// has to special-case gaps. `rows` holds (day, in_count, out_count) and may
/// contain days outside the window, which are ignored.
pub fn fill_daily_series(
    end: NaiveDate,
    days: u32,
    rows: &[(NaiveDate, i64, i64)],
) -> Vec<MovementSeriesPoint> {
    let start = end - Duration::days(days as i64 - 1);
    let mut series = Vec::with_capacity(days as usize);
    let mut day = start;
    while day <= end {
        let (stock_in, stock_out) = rows
            .iter()
            .find(|(d, _, _)| *d == day)
            .map(|(_, i, o)| (*i, *o))
            .unwrap_or((0, 0));
        series.push(MovementSeriesPoint {
            date: day,
            stock_in,
            stock_out,
        });
        day += Duration::days(1);
    }
    series
}

/// How warehouse distribution values are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// Count of distinct nonzero stock lines per warehouse
    Lines,
    /// Total units on hand per warehouse
    Units,
}

impl DistributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionMode::Lines => "lines",
            DistributionMode::Units => "units",
        }
    }
}

/// Error returned when parsing an unknown distribution mode string
#[derive(Debug, Error)]
#[error("unknown distribution mode: {0}")]
pub struct ParseDistributionModeError(pub String);

impl FromStr for DistributionMode {
    type Err = ParseDistributionModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines" => Ok(DistributionMode::Lines),
            "units" => Ok(DistributionMode::Units),
            other => Err(ParseDistributionModeError(other.to_string())),
        }
    }
}

/// Per-warehouse value for proportion charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseDistribution {
    pub warehouse_id: Uuid,
    pub warehouse: String,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_fill_daily_series_dense() {
        // Activity only on the first and last day of a 7-day window
        let rows = vec![(d("2026-08-01"), 3, 1), (d("2026-08-07"), 0, 2)];
        let series = fill_daily_series(d("2026-08-07"), 7, &rows);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d("2026-08-01"));
        assert_eq!(series[0].stock_in, 3);
        assert_eq!(series[0].stock_out, 1);
        for point in &series[1..6] {
            assert_eq!(point.stock_in, 0);
            assert_eq!(point.stock_out, 0);
        }
        assert_eq!(series[6].date, d("2026-08-07"));
        assert_eq!(series[6].stock_out, 2);
    }

    #[test]
    fn test_fill_daily_series_ignores_out_of_window_rows() {
        let rows = vec![(d("2026-07-01"), 9, 9), (d("2026-08-07"), 1, 0)];
        let series = fill_daily_series(d("2026-08-07"), 7, &rows);

        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|p| p.stock_in <= 1));
    }

    #[test]
    fn test_fill_daily_series_single_day() {
        let series = fill_daily_series(d("2026-08-07"), 1, &[]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, d("2026-08-07"));
    }

    #[test]
    fn test_distribution_mode_round_trip() {
        for m in [DistributionMode::Lines, DistributionMode::Units] {
            let parsed: DistributionMode = m.as_str().parse().unwrap();
            assert_eq!(parsed, m);
        }
        assert!("value".parse::<DistributionMode>().is_err());
    }
}
