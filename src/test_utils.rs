//! Shared test utilities for the tariff engine.
//!
//! This module provides an in-memory database setup, tariff builders with
//! sensible defaults, and directory doubles: [`MemoryDirectory`] records tags in
//! memory and [`FailingDirectory`] fails every call.

use crate::{
    core::{
        costs::CostBreakdown,
        directory::{Directory, Names},
        tariff::{NewTariff, create_tariff},
    },
    entities::{EquipmentType, TariffState, tariff},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test database plus an empty in-memory directory.
pub async fn setup_test_env() -> Result<(DatabaseConnection, MemoryDirectory)> {
    Ok((setup_test_db().await?, MemoryDirectory::default()))
}

#[derive(Debug, Default)]
struct MemoryState {
    tags: HashMap<String, i64>,
    links: BTreeSet<(i64, i64)>,
    names: Names,
}

/// Directory double that keeps tags, links and names in memory.
///
/// Any entity id can be tagged; names are only known once added with
/// [`MemoryDirectory::add_name`].
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: Mutex<MemoryState>,
}

impl MemoryDirectory {
    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    /// Registers a display name for an entity
    pub fn add_name(&self, entity_id: i64, name: &str) {
        self.with_state(|state| {
            state.names.insert(entity_id, name.to_string());
        });
    }

    /// All registered names
    pub fn names(&self) -> Names {
        self.with_state(|state| state.names.clone())
    }

    /// Whether the entity carries the tag with this name
    pub fn entity_has_tag(&self, entity_id: i64, tag_name: &str) -> bool {
        self.with_state(|state| {
            state
                .tags
                .get(tag_name)
                .is_some_and(|tag_id| state.links.contains(&(entity_id, *tag_id)))
        })
    }

    /// Number of entity-tag links
    pub fn link_count(&self) -> usize {
        self.with_state(|state| state.links.len())
    }

    /// Number of distinct tags
    pub fn tag_count(&self) -> usize {
        self.with_state(|state| state.tags.len())
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn find_or_create_tag(&self, name: &str) -> Result<i64> {
        Ok(self.with_state(|state| {
            let next_id = i64::try_from(state.tags.len()).unwrap_or(i64::MAX) + 1;
            *state.tags.entry(name.to_string()).or_insert(next_id)
        }))
    }

    async fn attach_tag(&self, entity_id: i64, tag_id: i64) -> Result<()> {
        self.with_state(|state| state.links.insert((entity_id, tag_id)));
        Ok(())
    }

    async fn has_tag(&self, entity_id: i64, tag_id: i64) -> Result<bool> {
        Ok(self.with_state(|state| state.links.contains(&(entity_id, tag_id))))
    }

    async fn display_name(&self, entity_id: i64) -> Result<Option<String>> {
        Ok(self.with_state(|state| state.names.get(&entity_id).cloned()))
    }
}

/// Directory double whose every call fails, as if the service were unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDirectory;

fn unreachable_directory() -> Error {
    Error::Directory {
        message: "directory service unreachable".to_string(),
    }
}

#[async_trait]
impl Directory for FailingDirectory {
    async fn find_or_create_tag(&self, _name: &str) -> Result<i64> {
        Err(unreachable_directory())
    }

    async fn attach_tag(&self, _entity_id: i64, _tag_id: i64) -> Result<()> {
        Err(unreachable_directory())
    }

    async fn has_tag(&self, _entity_id: i64, _tag_id: i64) -> Result<bool> {
        Err(unreachable_directory())
    }

    async fn display_name(&self, _entity_id: i64) -> Result<Option<String>> {
        Err(unreachable_directory())
    }
}

/// A valid tariff input with sensible defaults.
///
/// # Defaults
/// * forwarder 1, carrier 2, origin port 10, destination port 11, no country
/// * period 2025, June and July
/// * 40' high cube
/// * ocean freight 1000 + AMS 100 + insurance 50 + maneuvers 100 = 1250 all-in (25% surcharge)
/// * 25 days transit, 14 days free time
pub fn sample_new_tariff() -> NewTariff {
    NewTariff {
        forwarder_id: Some(1),
        carrier_id: Some(2),
        origin_port_id: Some(10),
        destination_port_id: Some(11),
        country_id: None,
        currency: None,
        year: Some("2025".to_string()),
        months: vec!["06".to_string(), "07".to_string()],
        equipment_type: Some(EquipmentType::HighCube40),
        costs: CostBreakdown {
            ocean_freight: Some(1000.0),
            ams_imo: Some(100.0),
            insurance_handling: Some(50.0),
            maneuvers: Some(100.0),
            ..CostBreakdown::default()
        },
        transit_time_days: 25,
        free_time_days: 14,
        notes: None,
        tariff_date: None,
    }
}

/// Creates a stored tariff for the given period, everything else as in
/// [`sample_new_tariff`].
pub async fn create_test_tariff(
    db: &DatabaseConnection,
    directory: &dyn Directory,
    year: &str,
    months: &[&str],
    today: NaiveDate,
) -> Result<tariff::Model> {
    let new = NewTariff {
        year: Some(year.to_string()),
        months: months.iter().map(|month| (*month).to_string()).collect(),
        ..sample_new_tariff()
    };
    create_tariff(db, directory, new, today).await
}

/// An in-memory active tariff row, for the pure KPI functions.
///
/// Ocean freight equals the all-in total; no carrier or country; origin 10,
/// destination 11, 40' high cube, 20 days transit and 7 days free time.
pub fn sample_model(
    id: i64,
    forwarder_id: i64,
    year: &str,
    months: &str,
    all_in_total: f64,
) -> tariff::Model {
    let timestamp = Utc::now().naive_utc();
    tariff::Model {
        id,
        forwarder_id,
        carrier_id: None,
        origin_port_id: 10,
        destination_port_id: 11,
        country_id: None,
        currency: "USD".to_string(),
        year: year.to_string(),
        months: months.to_string(),
        exw_cost: None,
        ocean_freight: Some(all_in_total),
        ams_imo: None,
        insurance_handling: None,
        maneuvers: None,
        empty_cleaning: None,
        agency_other: None,
        inland_freight: None,
        all_in_total,
        surcharge_pct: 0.0,
        route_label: format!("#{forwarder_id} | #10-#11 ({year}-{months})"),
        state: TariffState::Active,
        equipment_type: EquipmentType::HighCube40,
        transit_time_days: 20,
        free_time_days: 7,
        notes: None,
        tariff_date: timestamp.date(),
        is_archived: false,
        created_at: timestamp,
        updated_at: timestamp,
    }
}
