//! Seed file loading from TOML
//!
//! A seed file lists directory partners and tariffs. Tariffs name their
//! forwarder, carrier, ports and country by partner name; missing partners are
//! created on the fly. Every tariff goes through [`create_tariff`], so seeded
//! rows are validated and derived exactly like interactive ones.

use crate::{
    config::settings::Settings,
    core::{
        costs::CostBreakdown,
        directory::SeaDirectory,
        tariff::{NewTariff, create_tariff},
    },
    entities::EquipmentType,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;

/// Structure of a seed file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    /// Partners to create up front
    pub partners: Vec<PartnerSeed>,
    /// Tariffs to create
    pub tariffs: Vec<TariffSeed>,
}

/// A directory partner
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerSeed {
    /// Display name
    pub name: String,
}

/// A tariff whose references are partner names
#[derive(Debug, Clone, Deserialize)]
pub struct TariffSeed {
    /// Forwarder name
    pub forwarder: String,
    /// Carrier name
    #[serde(default)]
    pub carrier: Option<String>,
    /// Port of loading name
    pub origin: String,
    /// Port of discharge name
    pub destination: String,
    /// Destination country name
    #[serde(default)]
    pub country: Option<String>,
    /// ISO currency code, defaults to the configured currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Validity year
    pub year: String,
    /// Validity month codes
    pub months: Vec<String>,
    /// Equipment code, e.g. `"40HC"`
    pub equipment_type: EquipmentType,
    /// Cost components
    #[serde(default)]
    pub costs: CostBreakdown,
    /// Transit time in days
    #[serde(default)]
    pub transit_time_days: i32,
    /// Free time in days
    #[serde(default)]
    pub free_time_days: i32,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Quote date, defaults to the seeding date
    #[serde(default)]
    pub tariff_date: Option<NaiveDate>,
}

/// What a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Partners listed in `[[partners]]`
    pub partners: usize,
    /// Tariffs created
    pub tariffs: usize,
}

/// Loads a seed file from disk
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A tariff is missing a required key or names an unknown equipment code
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedFile> {
    let path_ref = path.as_ref();
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file {}: {e}", path_ref.display()),
    })
}

/// Creates the partners and tariffs of a seed file.
///
/// Stops at the first tariff that fails validation; tariffs before it stay
/// committed.
pub async fn apply_seed(
    db: &DatabaseConnection,
    directory: &SeaDirectory,
    seed: SeedFile,
    settings: &Settings,
    today: NaiveDate,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for partner in &seed.partners {
        directory.find_or_create_partner(&partner.name).await?;
        report.partners += 1;
    }

    for (index, tariff) in seed.tariffs.into_iter().enumerate() {
        let new = resolve_tariff(directory, tariff, settings).await?;
        let created = create_tariff(db, directory, new, today)
            .await
            .inspect_err(|e| tracing::error!("Seed tariff #{} rejected: {e}", index + 1))?;
        tracing::debug!("Seeded tariff {} ({})", created.id, created.route_label);
        report.tariffs += 1;
    }

    tracing::info!(
        "Seeded {} partners and {} tariffs",
        report.partners,
        report.tariffs
    );
    Ok(report)
}

async fn resolve_tariff(
    directory: &SeaDirectory,
    seed: TariffSeed,
    settings: &Settings,
) -> Result<NewTariff> {
    let forwarder = directory.find_or_create_partner(&seed.forwarder).await?;
    let origin = directory.find_or_create_partner(&seed.origin).await?;
    let destination = directory.find_or_create_partner(&seed.destination).await?;
    let carrier = match seed.carrier {
        Some(name) => Some(directory.find_or_create_partner(&name).await?.id),
        None => None,
    };
    let country = match seed.country {
        Some(name) => Some(directory.find_or_create_partner(&name).await?.id),
        None => None,
    };

    Ok(NewTariff {
        forwarder_id: Some(forwarder.id),
        carrier_id: carrier,
        origin_port_id: Some(origin.id),
        destination_port_id: Some(destination.id),
        country_id: country,
        currency: seed.currency,
        year: Some(seed.year),
        months: seed.months,
        equipment_type: Some(seed.equipment_type),
        costs: seed.costs,
        transit_time_days: seed.transit_time_days,
        free_time_days: seed.free_time_days,
        notes: seed.notes,
        tariff_date: seed.tariff_date,
    }
    .with_defaults(settings))
}
