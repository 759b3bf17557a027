//! Dashboard payload - every KPI bundled into one structure.
//!
//! Each section is computed independently from the same snapshot, so the
//! dashboard is just the KPI functions called side by side.

use crate::{
    config::settings::KpiSettings,
    core::{
        alerts::{Alert, alerts},
        directory::{Directory, Names, resolve_names},
        kpi::{
            Averages, Dimension, EquipmentStats, GroupStats, SummaryCounts, averages,
            equipment_comparison, stats_by, summary, top_by,
        },
        repository::load_snapshot,
        trend::{TrendPoint, Variation, monthly_trend, variation},
    },
    entities::tariff,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt;

/// The full operations dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Reporting date
    pub date: NaiveDate,
    /// Tariff counts
    pub summary: SummaryCounts,
    /// Averages over active tariffs
    pub averages: Averages,
    /// Forwarders with the most active tariffs
    pub top_forwarders: Vec<GroupStats>,
    /// Carriers with the most active tariffs
    pub top_carriers: Vec<GroupStats>,
    /// Lanes with the most active tariffs
    pub top_routes: Vec<GroupStats>,
    /// Active tariffs per equipment type
    pub by_equipment: Vec<GroupStats>,
    /// Active tariffs per destination country
    pub by_country: Vec<GroupStats>,
    /// Monthly trend, oldest bucket first
    pub trend: Vec<TrendPoint>,
    /// Change between the last two trend buckets
    pub variation: Variation,
    /// Alerts that fired
    pub alerts: Vec<Alert>,
    /// All-in spread for the common equipment types
    pub equipment_comparison: Vec<EquipmentStats>,
}

/// Builds the dashboard from an already loaded snapshot.
#[must_use]
pub fn dashboard_from_snapshot(
    records: &[tariff::Model],
    names: &Names,
    settings: &KpiSettings,
    today: NaiveDate,
) -> Dashboard {
    let trend = monthly_trend(records, settings.trend_months);
    let variation = variation(&trend, settings.variation_threshold_pct);

    Dashboard {
        date: today,
        summary: summary(records),
        averages: averages(records),
        top_forwarders: top_by(records, Dimension::Forwarder, settings.top_n, names),
        top_carriers: top_by(records, Dimension::Carrier, settings.top_n, names),
        top_routes: top_by(records, Dimension::Route, settings.top_n, names),
        by_equipment: stats_by(records, Dimension::Equipment, names),
        by_country: stats_by(records, Dimension::Country, names),
        trend,
        variation,
        alerts: alerts(records, today, settings),
        equipment_comparison: equipment_comparison(records, &settings.common_equipment),
    }
}

/// Loads the current snapshot, resolves directory names and builds the dashboard.
pub async fn build_dashboard(
    db: &DatabaseConnection,
    directory: &dyn Directory,
    settings: &KpiSettings,
    today: NaiveDate,
) -> Result<Dashboard> {
    let records = load_snapshot(db, today).await?;
    let names = resolve_names(
        directory,
        records.iter().flat_map(|record| {
            [
                Some(record.forwarder_id),
                record.carrier_id,
                Some(record.origin_port_id),
                Some(record.destination_port_id),
                record.country_id,
            ]
            .into_iter()
            .flatten()
        }),
    )
    .await;

    let dashboard = dashboard_from_snapshot(&records, &names, settings, today);
    tracing::debug!(
        "Built dashboard for {} with {} tariffs and {} alerts",
        today,
        dashboard.summary.total,
        dashboard.alerts.len()
    );
    Ok(dashboard)
}

/// Renders the dashboard as plain text for the terminal.
#[must_use]
pub fn format_dashboard_summary(dashboard: &Dashboard) -> String {
    dashboard.to_string()
}

impl fmt::Display for Dashboard {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = &self.summary;
        writeln!(
            out,
            "Tariff Dashboard - {} - {} tariffs ({} active, {} expired)",
            self.date.format("%B %Y"),
            counts.total,
            counts.active,
            counts.expired
        )?;
        writeln!(
            out,
            "  With carrier: {} | Without carrier: {}",
            counts.with_carrier, counts.without_carrier
        )?;

        let avg = &self.averages;
        writeln!(
            out,
            "  Avg all-in: ${:.2} | Avg ocean: ${:.2} | Surcharge: {:.2}% | Transit: {:.1}d | Free: {:.1}d",
            avg.avg_all_in,
            avg.avg_ocean_freight,
            avg.avg_surcharge_pct,
            avg.avg_transit_days,
            avg.avg_free_days
        )?;

        for (title, groups) in [
            ("Top forwarders", &self.top_forwarders),
            ("Top carriers", &self.top_carriers),
            ("Top routes", &self.top_routes),
            ("By equipment", &self.by_equipment),
            ("By country", &self.by_country),
        ] {
            if groups.is_empty() {
                continue;
            }
            writeln!(out, "\n{title}")?;
            for group in groups {
                writeln!(
                    out,
                    "  {} - {} tariffs | ${:.2} all-in | ${:.2} ocean | {:.1}d transit",
                    group.label,
                    group.count,
                    group.avg_all_in,
                    group.avg_ocean_freight,
                    group.avg_transit_days
                )?;
            }
        }

        if !self.trend.is_empty() {
            writeln!(out, "\nMonthly trend")?;
            for point in &self.trend {
                writeln!(
                    out,
                    "  {} - {} tariffs | ${:.2} all-in",
                    point.label, point.count, point.avg_all_in
                )?;
            }
            let change = &self.variation;
            writeln!(
                out,
                "  Variation: {:+.2}% ({})",
                change.variation_pct, change.direction
            )?;
        }

        if !self.equipment_comparison.is_empty() {
            writeln!(out, "\nEquipment comparison")?;
            for stats in &self.equipment_comparison {
                writeln!(
                    out,
                    "  {} - {} tariffs | ${:.2} - ${:.2} (avg ${:.2})",
                    stats.equipment, stats.count, stats.min_all_in, stats.max_all_in, stats.avg_all_in
                )?;
            }
        }

        if !self.alerts.is_empty() {
            writeln!(out, "\nAlerts")?;
            for alert in &self.alerts {
                writeln!(out, "  [{:?}] {}", alert.level, alert.message)?;
            }
        }

        Ok(())
    }
}
