//! Cost aggregation - all-in total and surcharge ratio.
//!
//! Both values are recomputed from the itemized components on every write; they
//! are never edited on their own.

use crate::{
    entities::tariff,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// Itemized cost components of a tariff, all in the tariff's currency.
///
/// Absent components count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBreakdown {
    /// Ex-works cost
    pub exw_cost: Option<f64>,
    /// Ocean freight
    pub ocean_freight: Option<f64>,
    /// AMS and IMO surcharges
    pub ams_imo: Option<f64>,
    /// Insurance and handling
    pub insurance_handling: Option<f64>,
    /// Port maneuvers
    pub maneuvers: Option<f64>,
    /// Empty container return and cleaning
    pub empty_cleaning: Option<f64>,
    /// Agency and other charges
    pub agency_other: Option<f64>,
    /// Inland freight
    pub inland_freight: Option<f64>,
}

impl CostBreakdown {
    /// Components paired with their field names, in a fixed order
    #[must_use]
    pub const fn components(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("exw_cost", self.exw_cost),
            ("ocean_freight", self.ocean_freight),
            ("ams_imo", self.ams_imo),
            ("insurance_handling", self.insurance_handling),
            ("maneuvers", self.maneuvers),
            ("empty_cleaning", self.empty_cleaning),
            ("agency_other", self.agency_other),
            ("inland_freight", self.inland_freight),
        ]
    }

    /// Rejects negative or non-finite components, naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.components() {
            if let Some(amount) = value
                && (!amount.is_finite() || amount < 0.0)
            {
                return Err(Error::InvalidAmount { field, amount });
            }
        }
        Ok(())
    }

    /// Cost components of a stored tariff
    #[must_use]
    pub const fn from_model(model: &tariff::Model) -> Self {
        Self {
            exw_cost: model.exw_cost,
            ocean_freight: model.ocean_freight,
            ams_imo: model.ams_imo,
            insurance_handling: model.insurance_handling,
            maneuvers: model.maneuvers,
            empty_cleaning: model.empty_cleaning,
            agency_other: model.agency_other,
            inland_freight: model.inland_freight,
        }
    }
}

/// Sum of all present cost components.
#[must_use]
pub fn compute_all_in(costs: &CostBreakdown) -> f64 {
    costs
        .components()
        .iter()
        .filter_map(|(_, value)| *value)
        .sum()
}

/// Non-ocean costs as a percentage of ocean freight, rounded to 2 decimals.
///
/// Zero when there is no ocean freight to compare against.
#[must_use]
pub fn compute_surcharge_pct(all_in: f64, ocean_freight: f64) -> f64 {
    if ocean_freight == 0.0 {
        return 0.0;
    }
    round_to(100.0 * (all_in - ocean_freight) / ocean_freight, 2)
}

/// Rounds to the given number of decimals.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn full_breakdown() -> CostBreakdown {
        CostBreakdown {
            exw_cost: Some(100.0),
            ocean_freight: Some(1000.0),
            ams_imo: Some(50.0),
            insurance_handling: Some(25.5),
            maneuvers: Some(80.0),
            empty_cleaning: Some(40.0),
            agency_other: Some(30.0),
            inland_freight: Some(200.0),
        }
    }

    #[test]
    fn test_all_in_sums_every_component() {
        assert_eq!(compute_all_in(&full_breakdown()), 1525.5);
    }

    #[test]
    fn test_all_in_treats_absent_as_zero() {
        let costs = CostBreakdown {
            ocean_freight: Some(1200.0),
            ams_imo: Some(35.0),
            ..Default::default()
        };
        assert_eq!(compute_all_in(&costs), 1235.0);
        assert_eq!(compute_all_in(&CostBreakdown::default()), 0.0);
    }

    #[test]
    fn test_all_in_is_idempotent() {
        let costs = full_breakdown();
        assert_eq!(compute_all_in(&costs), compute_all_in(&costs));
    }

    #[test]
    fn test_surcharge_pct() {
        assert_eq!(compute_surcharge_pct(1250.0, 1000.0), 25.0);
        assert_eq!(compute_surcharge_pct(1000.0, 1000.0), 0.0);
        assert_eq!(compute_surcharge_pct(1525.5, 1000.0), 52.55);
    }

    #[test]
    fn test_surcharge_pct_without_ocean_freight() {
        assert_eq!(compute_surcharge_pct(300.0, 0.0), 0.0);
    }

    #[test]
    fn test_validate_rejects_negative_component() {
        let costs = CostBreakdown {
            ocean_freight: Some(900.0),
            maneuvers: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            costs.validate(),
            Err(Error::InvalidAmount {
                field: "maneuvers",
                amount
            }) if amount == -1.0
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_component() {
        let costs = CostBreakdown {
            ocean_freight: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            costs.validate(),
            Err(Error::InvalidAmount {
                field: "ocean_freight",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_accepts_zero_and_absent() {
        let costs = CostBreakdown {
            exw_cost: Some(0.0),
            ..Default::default()
        };
        assert!(costs.validate().is_ok());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(7.25, 1), 7.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
