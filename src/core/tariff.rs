//! Tariff business logic - creating, updating, archiving and reading tariffs.
//!
//! Every write validates its input, recomputes the derived fields (all-in total,
//! surcharge, route label, state) and only then opens a database transaction, so
//! a reader never sees a row whose derived fields disagree with its inputs.
//! Directory tagging runs after commit and cannot fail the write.

use crate::{
    config::settings::Settings,
    core::{
        costs::{CostBreakdown, compute_all_in, compute_surcharge_pct},
        directory::{Directory, Names, TagRole, label_for, resolve_names},
        period::Period,
        tag_sync::sync_tags,
        validity::{compute_state, effective_state},
    },
    entities::{EquipmentType, Tariff, TariffState, tariff},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Currency used when a tariff arrives without one and no configured default
/// was applied with [`NewTariff::with_defaults`]
pub const DEFAULT_CURRENCY: &str = "USD";

/// Input for a new tariff.
///
/// Required references are optional here so that a missing one is reported as a
/// field-identified validation error rather than a type error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTariff {
    /// Quoting forwarder (required)
    pub forwarder_id: Option<i64>,
    /// Shipping line
    pub carrier_id: Option<i64>,
    /// Port of loading (required)
    pub origin_port_id: Option<i64>,
    /// Port of discharge (required)
    pub destination_port_id: Option<i64>,
    /// Destination country
    pub country_id: Option<i64>,
    /// ISO currency code; see [`NewTariff::with_defaults`]
    pub currency: Option<String>,
    /// Validity year (required)
    pub year: Option<String>,
    /// Validity month codes (at least one)
    pub months: Vec<String>,
    /// Quoted equipment (required)
    pub equipment_type: Option<EquipmentType>,
    /// Itemized costs
    pub costs: CostBreakdown,
    /// Transit time in days
    pub transit_time_days: i32,
    /// Free time in days
    pub free_time_days: i32,
    /// Free-text remarks
    pub notes: Option<String>,
    /// Quote date, today when absent
    pub tariff_date: Option<NaiveDate>,
}

impl NewTariff {
    /// Fills fields left empty from the configured settings.
    ///
    /// Currently only the currency, which otherwise falls back to [`DEFAULT_CURRENCY`].
    #[must_use]
    pub fn with_defaults(mut self, settings: &Settings) -> Self {
        if self.currency.is_none() {
            self.currency = Some(settings.default_currency.clone());
        }
        self
    }
}

/// Field changes for an existing tariff; `None` leaves a field untouched.
///
/// `costs` replaces the whole breakdown. The nested options on carrier, country
/// and notes allow clearing them.
#[derive(Debug, Clone, Default)]
pub struct TariffChanges {
    /// New forwarder
    pub forwarder_id: Option<i64>,
    /// New carrier, or `Some(None)` to clear it
    pub carrier_id: Option<Option<i64>>,
    /// New port of loading
    pub origin_port_id: Option<i64>,
    /// New port of discharge
    pub destination_port_id: Option<i64>,
    /// New country, or `Some(None)` to clear it
    pub country_id: Option<Option<i64>>,
    /// New currency code
    pub currency: Option<String>,
    /// New validity year
    pub year: Option<String>,
    /// New validity months
    pub months: Option<Vec<String>>,
    /// New equipment
    pub equipment_type: Option<EquipmentType>,
    /// Replacement cost breakdown
    pub costs: Option<CostBreakdown>,
    /// New transit time
    pub transit_time_days: Option<i32>,
    /// New free time
    pub free_time_days: Option<i32>,
    /// New notes, or `Some(None)` to clear them
    pub notes: Option<Option<String>>,
    /// New quote date
    pub tariff_date: Option<NaiveDate>,
}

/// A validated tariff, ready for derivation and storage
#[derive(Debug, Clone)]
struct TariffDraft {
    forwarder_id: i64,
    carrier_id: Option<i64>,
    origin_port_id: i64,
    destination_port_id: i64,
    country_id: Option<i64>,
    currency: String,
    period: Period,
    equipment_type: EquipmentType,
    costs: CostBreakdown,
    transit_time_days: i32,
    free_time_days: i32,
    notes: Option<String>,
    tariff_date: NaiveDate,
}

/// Fields computed from a draft at the write boundary
#[derive(Debug, Clone)]
struct Derived {
    all_in_total: f64,
    surcharge_pct: f64,
    route_label: String,
    state: TariffState,
}

impl TariffDraft {
    fn from_new(new: NewTariff, today: NaiveDate) -> Result<Self> {
        let forwarder_id = new
            .forwarder_id
            .ok_or_else(|| Error::validation("forwarder_id", "forwarder is required"))?;
        let origin_port_id = new
            .origin_port_id
            .ok_or_else(|| Error::validation("origin_port_id", "origin port is required"))?;
        let destination_port_id = new.destination_port_id.ok_or_else(|| {
            Error::validation("destination_port_id", "destination port is required")
        })?;
        let year = new
            .year
            .ok_or_else(|| Error::validation("year", "year is required"))?;
        let period = Period::new(&year, &new.months)?;
        let equipment_type = new
            .equipment_type
            .ok_or_else(|| Error::validation("equipment_type", "equipment is required"))?;

        let draft = Self {
            forwarder_id,
            carrier_id: new.carrier_id,
            origin_port_id,
            destination_port_id,
            country_id: new.country_id,
            currency: normalize_currency(new.currency)?,
            period,
            equipment_type,
            costs: new.costs,
            transit_time_days: new.transit_time_days,
            free_time_days: new.free_time_days,
            notes: normalize_notes(new.notes),
            tariff_date: new.tariff_date.unwrap_or(today),
        };
        draft.validate_amounts()?;
        Ok(draft)
    }

    /// Applies changes on top of a stored row.
    ///
    /// A stored period that the changes leave alone is kept as stored, so legacy
    /// rows with a malformed year can still be edited; a changed period is fully
    /// validated.
    fn from_stored_with_changes(existing: &tariff::Model, changes: TariffChanges) -> Result<Self> {
        let period = if changes.year.is_none() && changes.months.is_none() {
            Period::from_stored(&existing.year, &existing.months)
        } else {
            let year = changes.year.unwrap_or_else(|| existing.year.clone());
            let months = changes.months.unwrap_or_else(|| {
                Period::from_stored(&existing.year, &existing.months)
                    .months()
                    .map(|month| month.code().to_string())
                    .collect()
            });
            Period::new(&year, &months)?
        };
        if period.earliest_month().is_none() {
            return Err(Error::validation("months", "at least one month is required"));
        }

        let currency = match changes.currency {
            Some(currency) => normalize_currency(Some(currency))?,
            None => existing.currency.clone(),
        };
        let notes = match changes.notes {
            Some(notes) => normalize_notes(notes),
            None => existing.notes.clone(),
        };

        let draft = Self {
            forwarder_id: changes.forwarder_id.unwrap_or(existing.forwarder_id),
            carrier_id: changes.carrier_id.unwrap_or(existing.carrier_id),
            origin_port_id: changes.origin_port_id.unwrap_or(existing.origin_port_id),
            destination_port_id: changes
                .destination_port_id
                .unwrap_or(existing.destination_port_id),
            country_id: changes.country_id.unwrap_or(existing.country_id),
            currency,
            period,
            equipment_type: changes.equipment_type.unwrap_or(existing.equipment_type),
            costs: changes
                .costs
                .unwrap_or_else(|| CostBreakdown::from_model(existing)),
            transit_time_days: changes
                .transit_time_days
                .unwrap_or(existing.transit_time_days),
            free_time_days: changes.free_time_days.unwrap_or(existing.free_time_days),
            notes,
            tariff_date: changes.tariff_date.unwrap_or(existing.tariff_date),
        };
        draft.validate_amounts()?;
        Ok(draft)
    }

    fn validate_amounts(&self) -> Result<()> {
        self.costs.validate()?;
        for (field, days) in [
            ("transit_time_days", self.transit_time_days),
            ("free_time_days", self.free_time_days),
        ] {
            if days < 0 {
                return Err(Error::InvalidAmount {
                    field,
                    amount: f64::from(days),
                });
            }
        }
        Ok(())
    }

    /// Directory ids that appear in the route label
    const fn labelled_ids(&self) -> [i64; 3] {
        [
            self.forwarder_id,
            self.origin_port_id,
            self.destination_port_id,
        ]
    }

    const fn tag_references(&self) -> [(TagRole, Option<i64>); 4] {
        [
            (TagRole::Forwarder, Some(self.forwarder_id)),
            (TagRole::Carrier, self.carrier_id),
            (TagRole::PortOfLoading, Some(self.origin_port_id)),
            (TagRole::PortOfDischarge, Some(self.destination_port_id)),
        ]
    }

    fn compute_derived(&self, names: &Names, today: NaiveDate) -> Derived {
        let all_in_total = compute_all_in(&self.costs);
        let ocean_freight = self.costs.ocean_freight.unwrap_or(0.0);
        Derived {
            all_in_total,
            surcharge_pct: compute_surcharge_pct(all_in_total, ocean_freight),
            route_label: route_label(
                names,
                self.forwarder_id,
                self.origin_port_id,
                self.destination_port_id,
                &self.period,
            ),
            state: compute_state(&self.period, today),
        }
    }

    fn write_into(&self, derived: Derived, active: &mut tariff::ActiveModel) {
        active.forwarder_id = Set(self.forwarder_id);
        active.carrier_id = Set(self.carrier_id);
        active.origin_port_id = Set(self.origin_port_id);
        active.destination_port_id = Set(self.destination_port_id);
        active.country_id = Set(self.country_id);
        active.currency = Set(self.currency.clone());
        active.year = Set(self.period.year().to_string());
        active.months = Set(self.period.months_csv());
        active.exw_cost = Set(self.costs.exw_cost);
        active.ocean_freight = Set(self.costs.ocean_freight);
        active.ams_imo = Set(self.costs.ams_imo);
        active.insurance_handling = Set(self.costs.insurance_handling);
        active.maneuvers = Set(self.costs.maneuvers);
        active.empty_cleaning = Set(self.costs.empty_cleaning);
        active.agency_other = Set(self.costs.agency_other);
        active.inland_freight = Set(self.costs.inland_freight);
        active.all_in_total = Set(derived.all_in_total);
        active.surcharge_pct = Set(derived.surcharge_pct);
        active.route_label = Set(derived.route_label);
        active.state = Set(derived.state);
        active.equipment_type = Set(self.equipment_type);
        active.transit_time_days = Set(self.transit_time_days);
        active.free_time_days = Set(self.free_time_days);
        active.notes = Set(self.notes.clone());
        active.tariff_date = Set(self.tariff_date);
    }
}

fn normalize_currency(currency: Option<String>) -> Result<String> {
    let Some(currency) = currency else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    let code = currency.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::validation(
            "currency",
            format!("`{currency}` is not an ISO currency code"),
        ));
    }
    Ok(code)
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Display label for a tariff: `"<forwarder> | <origin>-<destination> (<year>-<month>)"`.
///
/// Unknown directory ids render as `#<id>`.
#[must_use]
pub fn route_label(
    names: &Names,
    forwarder_id: i64,
    origin_port_id: i64,
    destination_port_id: i64,
    period: &Period,
) -> String {
    let month = period.earliest_month().map_or("", |month| month.code());
    format!(
        "{} | {}-{} ({}-{month})",
        label_for(names, forwarder_id),
        label_for(names, origin_port_id),
        label_for(names, destination_port_id),
        period.year(),
    )
}

/// Creates a tariff after validating it and computing its derived fields.
///
/// Missing forwarder, origin, destination, year, months or equipment and negative
/// costs are rejected before anything is written. The referenced entities are
/// tagged in the directory once the row is committed.
pub async fn create_tariff(
    db: &DatabaseConnection,
    directory: &dyn Directory,
    new: NewTariff,
    today: NaiveDate,
) -> Result<tariff::Model> {
    let draft = TariffDraft::from_new(new, today)?;
    let names = resolve_names(directory, draft.labelled_ids()).await;
    let derived = draft.compute_derived(&names, today);

    let now = Utc::now().naive_utc();
    let mut active = tariff::ActiveModel {
        is_archived: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    draft.write_into(derived, &mut active);

    let txn = db.begin().await?;
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Created tariff {} ({}, all-in {:.2} {})",
        created.id,
        created.route_label,
        created.all_in_total,
        created.currency
    );

    sync_tags(directory, &draft.tag_references()).await;
    Ok(created)
}

/// Applies changes to a tariff and recomputes every derived field.
///
/// Fails with [`Error::TariffNotFound`] for an unknown id and
/// [`Error::TariffArchived`] for an archived tariff. On any error the stored row
/// is left as it was. References that changed are tagged after commit.
///
/// Directory names are resolved before the transaction opens; the row the
/// changes are applied to is read again inside it, so a concurrent update is
/// never overwritten with stale fields.
pub async fn update_tariff(
    db: &DatabaseConnection,
    directory: &dyn Directory,
    tariff_id: i64,
    changes: TariffChanges,
    today: NaiveDate,
) -> Result<tariff::Model> {
    let preview = find_editable(db, tariff_id).await?;
    let planned = TariffDraft::from_stored_with_changes(&preview, changes.clone())?;
    let names = resolve_names(directory, planned.labelled_ids()).await;

    let txn = db.begin().await?;
    let existing = find_editable(&txn, tariff_id).await?;
    let draft = TariffDraft::from_stored_with_changes(&existing, changes)?;
    let derived = draft.compute_derived(&names, today);

    let changed_refs: Vec<(TagRole, Option<i64>)> = [
        (TagRole::Forwarder, Some(existing.forwarder_id)),
        (TagRole::Carrier, existing.carrier_id),
        (TagRole::PortOfLoading, Some(existing.origin_port_id)),
        (TagRole::PortOfDischarge, Some(existing.destination_port_id)),
    ]
    .into_iter()
    .zip(draft.tag_references())
    .filter(|(before, after)| before != after)
    .map(|(_, after)| after)
    .collect();

    let mut active: tariff::ActiveModel = existing.into();
    draft.write_into(derived, &mut active);
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Updated tariff {} ({}, all-in {:.2} {}, {:?})",
        updated.id,
        updated.route_label,
        updated.all_in_total,
        updated.currency,
        updated.state
    );

    if !changed_refs.is_empty() {
        sync_tags(directory, &changed_refs).await;
    }
    Ok(updated)
}

/// Loads a tariff that may still be edited
async fn find_editable<C: ConnectionTrait>(conn: &C, tariff_id: i64) -> Result<tariff::Model> {
    let existing = Tariff::find_by_id(tariff_id)
        .one(conn)
        .await?
        .ok_or(Error::TariffNotFound { id: tariff_id })?;
    if existing.is_archived {
        return Err(Error::TariffArchived { id: tariff_id });
    }
    Ok(existing)
}

/// Soft-deletes a tariff: it disappears from every report but stays readable by id.
pub async fn archive_tariff(db: &DatabaseConnection, tariff_id: i64) -> Result<tariff::Model> {
    let existing = Tariff::find_by_id(tariff_id)
        .one(db)
        .await?
        .ok_or(Error::TariffNotFound { id: tariff_id })?;
    if existing.is_archived {
        return Ok(existing);
    }

    let mut active: tariff::ActiveModel = existing.into();
    active.is_archived = Set(true);
    active.updated_at = Set(Utc::now().naive_utc());
    let archived = active.update(db).await?;

    tracing::info!("Archived tariff {}", archived.id);
    Ok(archived)
}

/// Brings an archived tariff back, re-deriving its state for the given date.
pub async fn restore_tariff(
    db: &DatabaseConnection,
    tariff_id: i64,
    today: NaiveDate,
) -> Result<tariff::Model> {
    let existing = Tariff::find_by_id(tariff_id)
        .one(db)
        .await?
        .ok_or(Error::TariffNotFound { id: tariff_id })?;
    if !existing.is_archived {
        return Ok(existing);
    }

    let period = Period::from_stored(&existing.year, &existing.months);
    if period.earliest_month().is_none() {
        return Err(Error::validation("months", "at least one month is required"));
    }

    let mut active: tariff::ActiveModel = existing.into();
    active.is_archived = Set(false);
    active.state = Set(compute_state(&period, today));
    active.updated_at = Set(Utc::now().naive_utc());
    let restored = active.update(db).await?;

    tracing::info!("Restored tariff {}", restored.id);
    Ok(restored)
}

/// Finds a tariff by id, archived or not, with its state derived for `today`.
///
/// The stored state is only as fresh as the last write, so a lookup after a
/// month boundary reports what the dashboard would count.
pub async fn get_tariff(
    db: &DatabaseConnection,
    tariff_id: i64,
    today: NaiveDate,
) -> Result<Option<tariff::Model>> {
    let found = Tariff::find_by_id(tariff_id).one(db).await?;
    Ok(found.map(|mut record| {
        record.state = effective_state(&record, today);
        record
    }))
}
