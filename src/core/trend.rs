//! Monthly price trend and period-over-period variation.
//!
//! Tariffs are bucketed by their validity year and earliest month. The trend
//! covers every non-archived tariff, active or not, so expired quotes still show
//! where prices were.

use crate::{
    core::{
        costs::round_to,
        kpi::mean,
        period::{Month, Period},
    },
    entities::tariff,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One monthly trend bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Validity year
    pub year: String,
    /// Two-digit month code
    pub month: String,
    /// `"<year>-<month>"`
    pub label: String,
    /// Number of tariffs in the bucket
    pub count: usize,
    /// Mean all-in total
    pub avg_all_in: f64,
    /// Mean ocean freight
    pub avg_ocean_freight: f64,
}

/// Sort key for a bucket: numeric year first, the raw text breaks ties between
/// malformed years
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    year_number: i64,
    year: String,
    month: Month,
}

/// The most recent `limit` monthly buckets, oldest first.
#[must_use]
pub fn monthly_trend(records: &[tariff::Model], limit: usize) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<BucketKey, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for record in records {
        let period = Period::from_stored(&record.year, &record.months);
        let Some(month) = period.earliest_month() else {
            tracing::warn!("Tariff {} has no months, left out of the trend", record.id);
            continue;
        };
        let key = BucketKey {
            year_number: period.year().parse().unwrap_or(i64::MIN),
            year: period.year().to_string(),
            month,
        };
        let (all_in, ocean) = buckets.entry(key).or_default();
        all_in.push(record.all_in_total);
        ocean.push(record.ocean_freight.unwrap_or(0.0));
    }

    let mut recent: Vec<TrendPoint> = buckets
        .into_iter()
        .rev()
        .take(limit)
        .map(|(key, (all_in, ocean))| TrendPoint {
            label: format!("{}-{}", key.year, key.month.code()),
            month: key.month.code().to_string(),
            year: key.year,
            count: all_in.len(),
            avg_all_in: round_to(mean(&all_in), 2),
            avg_ocean_freight: round_to(mean(&ocean), 2),
        })
        .collect();
    recent.reverse();
    recent
}

/// Direction of the latest price movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Prices went up by more than the threshold
    Rise,
    /// Prices went down by more than the threshold
    Fall,
    /// Movement within the threshold
    Stable,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rise => "rise",
            Self::Fall => "fall",
            Self::Stable => "stable",
        })
    }
}

/// Change between the two most recent trend buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variation {
    /// Mean all-in of the latest bucket
    pub latest_avg_all_in: f64,
    /// Mean all-in of the bucket before it
    pub previous_avg_all_in: f64,
    /// Change in percent, rounded to 2 decimals
    pub variation_pct: f64,
    /// Classification against the threshold
    pub direction: Direction,
}

impl Default for Variation {
    fn default() -> Self {
        Self {
            latest_avg_all_in: 0.0,
            previous_avg_all_in: 0.0,
            variation_pct: 0.0,
            direction: Direction::Stable,
        }
    }
}

/// Compares the last two buckets of a chronological trend.
///
/// The change is zero when the previous average is not positive, and the
/// direction is `Rise`/`Fall` only when it exceeds `threshold_pct` strictly.
#[must_use]
pub fn variation(trend: &[TrendPoint], threshold_pct: f64) -> Variation {
    let [.., previous, latest] = trend else {
        return Variation::default();
    };

    let variation_pct = if previous.avg_all_in > 0.0 {
        round_to(
            (latest.avg_all_in - previous.avg_all_in) * 100.0 / previous.avg_all_in,
            2,
        )
    } else {
        0.0
    };

    let direction = if variation_pct > threshold_pct {
        Direction::Rise
    } else if variation_pct < -threshold_pct {
        Direction::Fall
    } else {
        Direction::Stable
    };

    Variation {
        latest_avg_all_in: latest.avg_all_in,
        previous_avg_all_in: previous.avg_all_in,
        variation_pct,
        direction,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn point(label: &str, avg_all_in: f64) -> TrendPoint {
        let (year, month) = label.split_once('-').unwrap_or((label, "01"));
        TrendPoint {
            year: year.to_string(),
            month: month.to_string(),
            label: label.to_string(),
            count: 1,
            avg_all_in,
            avg_ocean_freight: 0.0,
        }
    }

    #[test]
    fn test_trend_groups_by_year_and_earliest_month() {
        let records = vec![
            sample_model(1, 1, "2025", "03,04", 100.0),
            sample_model(2, 1, "2025", "03", 300.0),
            sample_model(3, 1, "2025", "01,12", 50.0),
            sample_model(4, 1, "2024", "11", 80.0),
        ];

        let trend = monthly_trend(&records, 6);
        let labels: Vec<&str> = trend.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-11", "2025-01", "2025-03"]);
        assert_eq!(trend[2].count, 2);
        assert_eq!(trend[2].avg_all_in, 200.0);
        assert_eq!(trend[2].avg_ocean_freight, 200.0);
    }

    #[test]
    fn test_trend_keeps_most_recent_buckets() {
        let records: Vec<tariff::Model> = (1..=12_i64)
            .map(|m| sample_model(m, 1, "2025", &format!("{m:02}"), 100.0))
            .collect();

        let trend = monthly_trend(&records, 6);
        assert_eq!(trend.len(), 6);
        assert_eq!(trend.first().map(|p| p.label.as_str()), Some("2025-07"));
        assert_eq!(trend.last().map(|p| p.label.as_str()), Some("2025-12"));
    }

    #[test]
    fn test_trend_orders_years_numerically() {
        let records = vec![
            sample_model(1, 1, "2025", "01", 100.0),
            sample_model(2, 1, "2024", "12", 100.0),
            sample_model(3, 1, "2026", "01", 100.0),
        ];
        let trend = monthly_trend(&records, 2);
        let labels: Vec<&str> = trend.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-01", "2026-01"]);
    }

    #[test]
    fn test_trend_merges_padded_years() {
        let records = vec![
            sample_model(1, 1, "2025", "06", 100.0),
            sample_model(2, 1, "02025", "06", 300.0),
        ];
        let trend = monthly_trend(&records, 6);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].label, "2025-06");
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[0].avg_all_in, 200.0);
    }

    #[test]
    fn test_trend_empty() {
        assert!(monthly_trend(&[], 6).is_empty());
    }

    #[test]
    fn test_variation_rise() {
        let v = variation(&[point("2025-01", 100.0), point("2025-02", 110.0)], 5.0);
        assert_eq!(v.variation_pct, 10.0);
        assert_eq!(v.direction, Direction::Rise);
        assert_eq!(v.latest_avg_all_in, 110.0);
        assert_eq!(v.previous_avg_all_in, 100.0);
    }

    #[test]
    fn test_variation_boundary_is_stable() {
        let v = variation(&[point("2025-01", 100.0), point("2025-02", 95.0)], 5.0);
        assert_eq!(v.variation_pct, -5.0);
        assert_eq!(v.direction, Direction::Stable);
    }

    #[test]
    fn test_variation_fall() {
        let v = variation(&[point("2025-01", 200.0), point("2025-02", 150.0)], 5.0);
        assert_eq!(v.variation_pct, -25.0);
        assert_eq!(v.direction, Direction::Fall);
    }

    #[test]
    fn test_variation_uses_last_two_buckets() {
        let trend = [
            point("2025-01", 500.0),
            point("2025-02", 100.0),
            point("2025-03", 104.0),
        ];
        let v = variation(&trend, 5.0);
        assert_eq!(v.variation_pct, 4.0);
        assert_eq!(v.direction, Direction::Stable);
    }

    #[test]
    fn test_variation_needs_two_buckets() {
        assert_eq!(variation(&[], 5.0), Variation::default());
        assert_eq!(variation(&[point("2025-01", 100.0)], 5.0), Variation::default());
    }

    #[test]
    fn test_variation_guards_zero_previous() {
        let v = variation(&[point("2025-01", 0.0), point("2025-02", 120.0)], 5.0);
        assert_eq!(v.variation_pct, 0.0);
        assert_eq!(v.direction, Direction::Stable);
    }
}
