//! Filtered and grouped reads over stored tariffs.
//!
//! Reads return rows as stored. Reporting code goes through [`load_snapshot`],
//! which drops archived rows and re-derives each state for the reporting date.
//! Grouping runs in process through [`kpi::group_stats`] so the repository and the
//! dashboard share one ordering rule.

use crate::{
    core::{
        directory::Names,
        kpi::{self, Dimension, GroupStats},
    },
    entities::{Tariff, tariff},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Value, prelude::*};

/// Equality and not-equal constraints on tariff columns, all of which must hold.
#[derive(Debug, Clone)]
pub struct TariffFilter {
    condition: Condition,
}

impl Default for TariffFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TariffFilter {
    /// A filter matching every tariff, archived ones included.
    #[must_use]
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
        }
    }

    /// A filter matching the tariffs reports look at: everything not archived.
    #[must_use]
    pub fn reportable() -> Self {
        Self::new().eq(tariff::Column::IsArchived, false)
    }

    /// Requires `column == value`.
    #[must_use]
    pub fn eq<V: Into<Value>>(self, column: tariff::Column, value: V) -> Self {
        Self {
            condition: self.condition.add(column.eq(value)),
        }
    }

    /// Requires `column != value`.
    #[must_use]
    pub fn ne<V: Into<Value>>(self, column: tariff::Column, value: V) -> Self {
        Self {
            condition: self.condition.add(column.ne(value)),
        }
    }
}

/// Tariffs matching the filter, ordered by id.
pub async fn find(db: &DatabaseConnection, filter: &TariffFilter) -> Result<Vec<tariff::Model>> {
    Ok(Tariff::find()
        .filter(filter.condition.clone())
        .order_by_asc(tariff::Column::Id)
        .all(db)
        .await?)
}

/// Number of tariffs matching the filter.
pub async fn count(db: &DatabaseConnection, filter: &TariffFilter) -> Result<u64> {
    Ok(Tariff::find()
        .filter(filter.condition.clone())
        .count(db)
        .await?)
}

/// Count and averages of the matching tariffs per group of a dimension.
pub async fn group_by(
    db: &DatabaseConnection,
    filter: &TariffFilter,
    dimension: Dimension,
    names: &Names,
) -> Result<Vec<GroupStats>> {
    let records = find(db, filter).await?;
    Ok(kpi::group_stats(&records, dimension, names))
}

/// Non-archived tariffs with their state re-derived for `today`.
pub async fn load_snapshot(db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<tariff::Model>> {
    let records = find(db, &TariffFilter::reportable()).await?;
    Ok(kpi::snapshot(records, today))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::tariff::{NewTariff, archive_tariff, create_tariff};
    use crate::entities::{EquipmentType, TariffState};
    use crate::test_utils::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_find_and_count_with_filters() -> Result<()> {
        let (db, directory) = setup_test_env().await?;
        let today = date(2025, 6, 1);

        let first = create_tariff(&db, &directory, sample_new_tariff(), today).await?;
        let second = create_tariff(
            &db,
            &directory,
            NewTariff {
                equipment_type: Some(EquipmentType::Standard20),
                ..sample_new_tariff()
            },
            today,
        )
        .await?;
        let third = create_tariff(&db, &directory, sample_new_tariff(), today).await?;
        archive_tariff(&db, third.id).await?;

        assert_eq!(count(&db, &TariffFilter::new()).await?, 3);
        assert_eq!(count(&db, &TariffFilter::reportable()).await?, 2);

        let high_cube = TariffFilter::reportable()
            .eq(tariff::Column::EquipmentType, EquipmentType::HighCube40);
        let ids: Vec<i64> = find(&db, &high_cube).await?.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id]);

        let not_high_cube = TariffFilter::new()
            .ne(tariff::Column::EquipmentType, EquipmentType::HighCube40);
        let ids: Vec<i64> = find(&db, &not_high_cube).await?.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_group_by_counts_match_filtered_total() -> Result<()> {
        let (db, directory) = setup_test_env().await?;
        directory.add_name(1, "Blue Anchor");
        let today = date(2025, 6, 1);

        for forwarder in [1, 3, 1, 4, 3, 1] {
            create_tariff(
                &db,
                &directory,
                NewTariff {
                    forwarder_id: Some(forwarder),
                    ..sample_new_tariff()
                },
                today,
            )
            .await?;
        }

        let filter = TariffFilter::reportable();
        let groups = group_by(&db, &filter, Dimension::Forwarder, &directory.names()).await?;
        let shape: Vec<(&str, usize)> = groups
            .iter()
            .map(|g| (g.label.as_str(), g.count))
            .collect();
        assert_eq!(shape, vec![("Blue Anchor", 3), ("#3", 2), ("#4", 1)]);
        assert_eq!(
            groups.iter().map(|g| g.count as u64).sum::<u64>(),
            count(&db, &filter).await?
        );
        assert_eq!(groups[0].avg_all_in, 1_250.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_snapshot_rederives_state() -> Result<()> {
        let (db, directory) = setup_test_env().await?;
        let created = create_tariff(&db, &directory, sample_new_tariff(), date(2025, 6, 1)).await?;
        assert_eq!(created.state, TariffState::Active);

        // No write happens between the two dates, the stored row still says active
        let later = load_snapshot(&db, date(2025, 8, 1)).await?;
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].state, TariffState::Expired);

        let stored = find(&db, &TariffFilter::new()).await?;
        assert_eq!(stored[0].state, TariffState::Active);
        Ok(())
    }
}
