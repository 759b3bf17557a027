//! Validity state machine.
//!
//! A tariff is `active` while any month of its period is the current month or
//! later, and `expired` once every month has passed. The state is a pure function
//! of `(year, months, today)`: it is stored on every write for filtering, and every
//! report re-derives it so a stored value never outlives a month boundary.

use crate::{
    core::period::{Month, Period},
    entities::{Tariff, TariffState, tariff},
    errors::Result,
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::cmp::Ordering;

/// Today's date in UTC, the reference date for every write and report.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Computes the validity state of a period on the given date.
///
/// A year that does not parse as an integer fails open to `Active` and is logged
/// as a data-quality warning.
#[must_use]
pub fn compute_state(period: &Period, today: NaiveDate) -> TariffState {
    let Ok(tariff_year) = period.year().parse::<i32>() else {
        tracing::warn!(
            "Tariff year `{}` is not numeric, treating tariff as active",
            period.year()
        );
        return TariffState::Active;
    };

    match tariff_year.cmp(&today.year()) {
        Ordering::Less => TariffState::Expired,
        Ordering::Greater => TariffState::Active,
        Ordering::Equal => {
            let current = Month::from_number(today.month());
            if period.months().any(|month| Some(month) >= current) {
                TariffState::Active
            } else {
                TariffState::Expired
            }
        }
    }
}

/// Re-derives the state of a stored tariff on the given date.
#[must_use]
pub fn effective_state(record: &tariff::Model, today: NaiveDate) -> TariffState {
    compute_state(&Period::from_stored(&record.year, &record.months), today)
}

/// Whether the stored state still matches what [`compute_state`] gives today.
#[must_use]
pub fn state_is_current(record: &tariff::Model, today: NaiveDate) -> bool {
    record.state == effective_state(record, today)
}

/// Re-persists the state of every non-archived tariff whose stored value has drifted.
///
/// Runs in a single transaction and returns the number of rows changed.
pub async fn refresh_states(db: &DatabaseConnection, today: NaiveDate) -> Result<u64> {
    let txn = db.begin().await?;

    let records = Tariff::find()
        .filter(tariff::Column::IsArchived.eq(false))
        .all(&txn)
        .await?;

    let now = Utc::now().naive_utc();
    let mut changed = 0;
    for record in records {
        let state = effective_state(&record, today);
        if record.state == state {
            continue;
        }
        tracing::debug!(
            "Tariff {} state {:?} -> {:?}",
            record.id,
            record.state,
            state
        );
        let mut active_model: tariff::ActiveModel = record.into();
        active_model.state = Set(state);
        active_model.updated_at = Set(now);
        active_model.update(&txn).await?;
        changed += 1;
    }

    txn.commit().await?;
    tracing::info!("Refreshed tariff states, {changed} changed");
    Ok(changed)
}
