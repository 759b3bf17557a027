//! KPI aggregation over a tariff snapshot.
//!
//! A snapshot is the set of non-archived tariffs with their state re-derived for
//! the reporting date. Every function here is pure over a snapshot and can be
//! called on its own or through the dashboard. Averages are rounded to 2 decimals
//! (1 for day counts) and empty inputs produce zero-valued results.
//!
//! Grouping is deterministic: groups are ordered by record count, descending,
//! and groups with equal counts keep the order in which they first appear when
//! the records are scanned by ascending id.

use crate::{
    core::{
        costs::round_to,
        directory::{Names, label_for},
        validity::effective_state,
    },
    entities::{EquipmentType, TariffState, tariff},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Builds a reporting snapshot: drops archived tariffs and re-derives every state
/// for `today`, then orders records by id.
#[must_use]
pub fn snapshot(records: Vec<tariff::Model>, today: NaiveDate) -> Vec<tariff::Model> {
    let mut current: Vec<tariff::Model> = records
        .into_iter()
        .filter(|record| !record.is_archived)
        .map(|mut record| {
            record.state = effective_state(&record, today);
            record
        })
        .collect();
    current.sort_by_key(|record| record.id);
    current
}

/// Active records of a snapshot, in snapshot order
pub fn active(records: &[tariff::Model]) -> impl Iterator<Item = &tariff::Model> {
    records
        .iter()
        .filter(|record| record.state == TariffState::Active)
}

/// Arithmetic mean, zero for an empty input.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Tariff counts for the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    /// All non-archived tariffs
    pub total: usize,
    /// Tariffs still valid
    pub active: usize,
    /// Tariffs past their validity window
    pub expired: usize,
    /// Tariffs naming a carrier
    pub with_carrier: usize,
    /// Tariffs without a carrier
    pub without_carrier: usize,
}

/// Counts tariffs by state and carrier presence.
#[must_use]
pub fn summary(records: &[tariff::Model]) -> SummaryCounts {
    let active = active(records).count();
    let with_carrier = records
        .iter()
        .filter(|record| record.carrier_id.is_some())
        .count();
    SummaryCounts {
        total: records.len(),
        active,
        expired: records.len() - active,
        with_carrier,
        without_carrier: records.len() - with_carrier,
    }
}

/// Averages over active tariffs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    /// Mean all-in total
    pub avg_all_in: f64,
    /// Mean ocean freight
    pub avg_ocean_freight: f64,
    /// Mean transit time in days
    pub avg_transit_days: f64,
    /// Mean free time in days
    pub avg_free_days: f64,
    /// Mean surcharge percentage
    pub avg_surcharge_pct: f64,
}

/// Computes the averages over active tariffs.
#[must_use]
pub fn averages(records: &[tariff::Model]) -> Averages {
    let active: Vec<&tariff::Model> = active(records).collect();
    let column = |value: fn(&tariff::Model) -> f64| -> Vec<f64> {
        active.iter().map(|record| value(record)).collect()
    };

    Averages {
        avg_all_in: round_to(mean(&column(|r| r.all_in_total)), 2),
        avg_ocean_freight: round_to(mean(&column(|r| r.ocean_freight.unwrap_or(0.0))), 2),
        avg_transit_days: round_to(mean(&column(|r| f64::from(r.transit_time_days))), 1),
        avg_free_days: round_to(mean(&column(|r| f64::from(r.free_time_days))), 1),
        avg_surcharge_pct: round_to(mean(&column(|r| r.surcharge_pct)), 2),
    }
}

/// Dimension a set of tariffs can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Quoting forwarder
    Forwarder,
    /// Shipping line; tariffs without one are left out
    Carrier,
    /// Origin and destination port pair
    Route,
    /// Equipment type
    Equipment,
    /// Destination country; tariffs without one form an `Unassigned` group
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Entity(i64),
    Route(i64, i64),
    Equipment(EquipmentType),
    Unassigned,
}

impl GroupKey {
    fn key(self) -> String {
        match self {
            Self::Entity(id) => id.to_string(),
            Self::Route(origin, destination) => format!("{origin}-{destination}"),
            Self::Equipment(equipment) => equipment.code(),
            Self::Unassigned => "none".to_string(),
        }
    }

    fn label(self, names: &Names) -> String {
        match self {
            Self::Entity(id) => label_for(names, id),
            Self::Route(origin, destination) => format!(
                "{} - {}",
                label_for(names, origin),
                label_for(names, destination)
            ),
            Self::Equipment(equipment) => equipment.code(),
            Self::Unassigned => "Unassigned".to_string(),
        }
    }
}

impl Dimension {
    fn group_key(self, record: &tariff::Model) -> Option<GroupKey> {
        match self {
            Self::Forwarder => Some(GroupKey::Entity(record.forwarder_id)),
            Self::Carrier => record.carrier_id.map(GroupKey::Entity),
            Self::Route => Some(GroupKey::Route(
                record.origin_port_id,
                record.destination_port_id,
            )),
            Self::Equipment => Some(GroupKey::Equipment(record.equipment_type)),
            Self::Country => Some(
                record
                    .country_id
                    .map_or(GroupKey::Unassigned, GroupKey::Entity),
            ),
        }
    }
}

/// Statistics of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    /// Stable group key (directory id, `origin-destination` ids or equipment code)
    pub key: String,
    /// Display label
    pub label: String,
    /// Number of tariffs in the group
    pub count: usize,
    /// Mean all-in total
    pub avg_all_in: f64,
    /// Mean ocean freight
    pub avg_ocean_freight: f64,
    /// Mean transit time in days
    pub avg_transit_days: f64,
}

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    all_in: f64,
    ocean_freight: f64,
    transit_days: f64,
}

/// Groups records by a dimension.
///
/// Ordered by count descending; equal counts keep first-appearance order.
pub fn group_stats<'a, I>(records: I, dimension: Dimension, names: &Names) -> Vec<GroupStats>
where
    I: IntoIterator<Item = &'a tariff::Model>,
{
    let mut order: Vec<(GroupKey, GroupAccumulator)> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let Some(key) = dimension.group_key(record) else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            order.push((key, GroupAccumulator::default()));
            order.len() - 1
        });
        let acc = &mut order[slot].1;
        acc.count += 1;
        acc.all_in += record.all_in_total;
        acc.ocean_freight += record.ocean_freight.unwrap_or(0.0);
        acc.transit_days += f64::from(record.transit_time_days);
    }

    let mut groups: Vec<GroupStats> = order
        .into_iter()
        .map(|(key, acc)| {
            let n = acc.count as f64;
            GroupStats {
                key: key.key(),
                label: key.label(names),
                count: acc.count,
                avg_all_in: round_to(acc.all_in / n, 2),
                avg_ocean_freight: round_to(acc.ocean_freight / n, 2),
                avg_transit_days: round_to(acc.transit_days / n, 1),
            }
        })
        .collect();
    // Stable sort keeps first-appearance order among equal counts
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// The `limit` largest groups of active tariffs for a dimension.
#[must_use]
pub fn top_by(
    records: &[tariff::Model],
    dimension: Dimension,
    limit: usize,
    names: &Names,
) -> Vec<GroupStats> {
    let mut groups = group_stats(active(records), dimension, names);
    groups.truncate(limit);
    groups
}

/// All groups of active tariffs for a dimension.
#[must_use]
pub fn stats_by(records: &[tariff::Model], dimension: Dimension, names: &Names) -> Vec<GroupStats> {
    group_stats(active(records), dimension, names)
}

/// All-in spread for one equipment type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquipmentStats {
    /// Equipment type
    pub equipment: EquipmentType,
    /// Number of active tariffs
    pub count: usize,
    /// Cheapest all-in total
    pub min_all_in: f64,
    /// Most expensive all-in total
    pub max_all_in: f64,
    /// Mean all-in total
    pub avg_all_in: f64,
}

/// All-in spread of active tariffs for each listed equipment type that has any.
///
/// Results follow the order of `equipment`.
#[must_use]
pub fn equipment_comparison(
    records: &[tariff::Model],
    equipment: &[EquipmentType],
) -> Vec<EquipmentStats> {
    equipment
        .iter()
        .filter_map(|&kind| {
            let totals: Vec<f64> = active(records)
                .filter(|record| record.equipment_type == kind)
                .map(|record| record.all_in_total)
                .collect();
            if totals.is_empty() {
                return None;
            }
            Some(EquipmentStats {
                equipment: kind,
                count: totals.len(),
                min_all_in: totals.iter().copied().fold(f64::INFINITY, f64::min),
                max_all_in: totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                avg_all_in: round_to(mean(&totals), 2),
            })
        })
        .collect()
}
