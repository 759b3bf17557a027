//! Cheapest-quote lookup.

use crate::{
    core::{
        directory::{Directory, label_for, resolve_names},
        kpi::active,
        repository::load_snapshot,
    },
    entities::{EquipmentType, tariff},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Number of quotes returned by [`cheapest_quotes`]
pub const CHEAPEST_LIMIT: usize = 5;

/// Optional lane and equipment constraints for a quote lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    /// Origin port id
    pub origin_port_id: Option<i64>,
    /// Destination port id
    pub destination_port_id: Option<i64>,
    /// Equipment type
    pub equipment_type: Option<EquipmentType>,
}

impl QuoteFilter {
    fn matches(&self, record: &tariff::Model) -> bool {
        self.origin_port_id
            .is_none_or(|origin| record.origin_port_id == origin)
            && self
                .destination_port_id
                .is_none_or(|destination| record.destination_port_id == destination)
            && self
                .equipment_type
                .is_none_or(|equipment| record.equipment_type == equipment)
    }
}

/// The `limit` cheapest active tariffs matching the filter, cheapest first.
///
/// Equal all-in totals keep snapshot (ascending id) order.
#[must_use]
pub fn cheapest<'a>(
    records: &'a [tariff::Model],
    filter: &QuoteFilter,
    limit: usize,
) -> Vec<&'a tariff::Model> {
    let mut matching: Vec<&tariff::Model> =
        active(records).filter(|record| filter.matches(record)).collect();
    matching.sort_by(|a, b| a.all_in_total.total_cmp(&b.all_in_total));
    matching.truncate(limit);
    matching
}

/// A ranked quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestQuote {
    /// Tariff id
    pub id: i64,
    /// Route label of the tariff
    pub label: String,
    /// Forwarder display name
    pub forwarder_name: String,
    /// Carrier display name, if the tariff names one
    pub carrier_name: Option<String>,
    /// All-in total
    pub all_in_total: f64,
    /// Transit time in days
    pub transit_time_days: i32,
}

/// Looks up the cheapest active quotes for a lane, with directory names.
pub async fn cheapest_quotes(
    db: &DatabaseConnection,
    directory: &dyn Directory,
    filter: &QuoteFilter,
    today: NaiveDate,
) -> Result<Vec<CheapestQuote>> {
    let records = load_snapshot(db, today).await?;
    let ranked = cheapest(&records, filter, CHEAPEST_LIMIT);

    let names = resolve_names(
        directory,
        ranked
            .iter()
            .flat_map(|record| [Some(record.forwarder_id), record.carrier_id])
            .flatten(),
    )
    .await;

    Ok(ranked
        .into_iter()
        .map(|record| CheapestQuote {
            id: record.id,
            label: record.route_label.clone(),
            forwarder_name: label_for(&names, record.forwarder_id),
            carrier_name: record.carrier_id.map(|carrier| label_for(&names, carrier)),
            all_in_total: record.all_in_total,
            transit_time_days: record.transit_time_days,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::tariff::{NewTariff, archive_tariff, create_tariff};
    use crate::entities::TariffState;
    use crate::test_utils::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_cheapest_keeps_ties_in_insertion_order() {
        let records: Vec<tariff::Model> = [300.0, 100.0, 250.0, 100.0, 400.0]
            .into_iter()
            .zip(1..)
            .map(|(all_in, id)| sample_model(id, 1, "2025", "09", all_in))
            .collect();

        let ranked: Vec<(i64, f64)> = cheapest(&records, &QuoteFilter::default(), 5)
            .into_iter()
            .map(|record| (record.id, record.all_in_total))
            .collect();
        assert_eq!(
            ranked,
            vec![(2, 100.0), (4, 100.0), (3, 250.0), (1, 300.0), (5, 400.0)]
        );
    }

    #[test]
    fn test_cheapest_applies_filter_and_limit() {
        let mut records: Vec<tariff::Model> = (1..=8)
            .map(|id| sample_model(id, 1, "2025", "09", 1_000.0 - id as f64))
            .collect();
        records[0].destination_port_id = 99;
        records[1].equipment_type = EquipmentType::Standard20;
        records[2].state = TariffState::Expired;

        let filter = QuoteFilter {
            origin_port_id: Some(records[3].origin_port_id),
            destination_port_id: Some(records[3].destination_port_id),
            equipment_type: Some(EquipmentType::HighCube40),
        };
        let ids: Vec<i64> = cheapest(&records, &filter, CHEAPEST_LIMIT)
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_cheapest_empty() {
        assert!(cheapest(&[], &QuoteFilter::default(), CHEAPEST_LIMIT).is_empty());
    }

    #[tokio::test]
    async fn test_cheapest_quotes_resolves_names() -> Result<()> {
        let (db, directory) = setup_test_env().await?;
        directory.add_name(1, "Blue Anchor");
        directory.add_name(2, "Maersk");

        let with_carrier = create_tariff(&db, &directory, sample_new_tariff(), today()).await?;
        let mut no_carrier = NewTariff {
            carrier_id: None,
            ..sample_new_tariff()
        };
        no_carrier.costs.ocean_freight = Some(500.0);
        let cheaper = create_tariff(&db, &directory, no_carrier, today()).await?;
        let archived = create_tariff(&db, &directory, sample_new_tariff(), today()).await?;
        archive_tariff(&db, archived.id).await?;

        let quotes = cheapest_quotes(&db, &directory, &QuoteFilter::default(), today()).await?;
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].id, cheaper.id);
        assert_eq!(quotes[0].all_in_total, 750.0);
        assert_eq!(quotes[0].carrier_name, None);
        assert_eq!(quotes[1].id, with_carrier.id);
        assert_eq!(quotes[1].forwarder_name, "Blue Anchor");
        assert_eq!(quotes[1].carrier_name.as_deref(), Some("Maersk"));
        assert_eq!(quotes[1].label, with_carrier.route_label);
        assert_eq!(quotes[1].transit_time_days, 25);
        Ok(())
    }
}
