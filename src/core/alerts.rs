//! Rule-based dashboard alerts.

use crate::{
    config::settings::KpiSettings,
    core::{kpi::active, period::Period},
    entities::{TariffState, tariff},
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Needs attention soon
    Warning,
    /// Informational
    Info,
    /// Coverage problem
    Danger,
}

/// A dashboard alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Severity
    pub level: AlertLevel,
    /// Human readable message
    pub message: String,
}

impl Alert {
    fn new(level: AlertLevel, message: String) -> Self {
        Self { level, message }
    }
}

/// Evaluates every alert rule over a snapshot.
///
/// Rules are independent and fire in a fixed order: tariffs expiring this month,
/// expired backlog, then forwarder coverage.
#[must_use]
pub fn alerts(records: &[tariff::Model], today: NaiveDate, settings: &KpiSettings) -> Vec<Alert> {
    let mut fired = Vec::new();

    let expiring = expiring_this_month(records, today);
    if expiring > 0 {
        fired.push(Alert::new(
            AlertLevel::Warning,
            format!("{expiring} tariff(s) expire this month"),
        ));
    }

    let expired = records
        .iter()
        .filter(|record| record.state == TariffState::Expired)
        .count();
    if expired > settings.expired_alert_threshold {
        fired.push(Alert::new(
            AlertLevel::Info,
            format!("{expired} expired tariffs in system"),
        ));
    }

    let forwarders: HashSet<i64> = active(records).map(|record| record.forwarder_id).collect();
    if forwarders.len() < settings.min_active_forwarders {
        fired.push(Alert::new(
            AlertLevel::Danger,
            format!("Only {} forwarder(s) with active tariffs", forwarders.len()),
        ));
    }

    fired
}

/// Active tariffs whose validity starts in the current month.
fn expiring_this_month(records: &[tariff::Model], today: NaiveDate) -> usize {
    let year = today.year().to_string();
    let month = today.month();
    active(records)
        .filter(|record| {
            let period = Period::from_stored(&record.year, &record.months);
            period.year() == year
                && period
                    .earliest_month()
                    .is_some_and(|earliest| earliest.number() == month)
        })
        .count()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn expired_model(id: i64, forwarder_id: i64) -> tariff::Model {
        let mut model = sample_model(id, forwarder_id, "2024", "01", 100.0);
        model.state = TariffState::Expired;
        model
    }

    #[test]
    fn test_alerts_backlog_and_coverage() {
        let settings = KpiSettings::default();
        let mut records: Vec<tariff::Model> = (1..=11).map(|id| expired_model(id, 1)).collect();
        records.push(sample_model(12, 1, "2025", "09", 100.0));
        records.push(sample_model(13, 2, "2025", "10", 100.0));

        let fired = alerts(&records, today(), &settings);
        assert_eq!(
            fired,
            vec![
                Alert::new(AlertLevel::Info, "11 expired tariffs in system".to_string()),
                Alert::new(
                    AlertLevel::Danger,
                    "Only 2 forwarder(s) with active tariffs".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_alerts_three_forwarders_is_enough() {
        let settings = KpiSettings::default();
        let records = vec![
            sample_model(1, 1, "2025", "09", 100.0),
            sample_model(2, 2, "2025", "09", 100.0),
            sample_model(3, 3, "2025", "10", 100.0),
        ];
        assert!(alerts(&records, today(), &settings).is_empty());
    }

    #[test]
    fn test_alerts_expiring_this_month() {
        let settings = KpiSettings::default();
        let records = vec![
            sample_model(1, 1, "2025", "07,08", 100.0),
            sample_model(2, 2, "2025", "07", 100.0),
            sample_model(3, 3, "2025", "06,07", 100.0),
            sample_model(4, 3, "2024", "07", 100.0),
            sample_model(5, 3, "02025", "07", 100.0),
        ];

        let fired = alerts(&records, today(), &settings);
        assert_eq!(
            fired,
            vec![Alert::new(
                AlertLevel::Warning,
                "3 tariff(s) expire this month".to_string()
            )]
        );
    }

    #[test]
    fn test_alerts_expired_threshold_is_strict() {
        let settings = KpiSettings::default();
        let mut records: Vec<tariff::Model> = (1..=10).map(|id| expired_model(id, 1)).collect();
        records.extend((11..=13).map(|id| sample_model(id, id, "2025", "12", 100.0)));
        assert!(alerts(&records, today(), &settings).is_empty());
    }

    #[test]
    fn test_alerts_empty_snapshot() {
        let fired = alerts(&[], today(), &KpiSettings::default());
        assert_eq!(
            fired,
            vec![Alert::new(
                AlertLevel::Danger,
                "Only 0 forwarder(s) with active tariffs".to_string()
            )]
        );
    }

    #[test]
    fn test_alerts_follow_settings() {
        let settings = KpiSettings {
            expired_alert_threshold: 0,
            min_active_forwarders: 1,
            ..KpiSettings::default()
        };
        let records = vec![expired_model(1, 1), sample_model(2, 1, "2025", "12", 100.0)];
        let fired = alerts(&records, today(), &settings);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].level, AlertLevel::Info);
    }
}
