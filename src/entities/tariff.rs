//! Tariff entity - One quoted price for a lane, equipment type and validity period.
//!
//! Forwarder, carrier, ports and country are weak references into the partner
//! directory; this table never owns them. `all_in_total`, `surcharge_pct`,
//! `route_label` and `state` are derived at the write boundary and must not be
//! edited independently of their inputs.

use sea_orm::{ActiveEnum, Iterable};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validity classification of a tariff relative to the current date
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TariffState {
    /// The validity window has not ended
    #[sea_orm(string_value = "active")]
    Active,
    /// Every month of the validity window is in the past
    #[sea_orm(string_value = "expired")]
    Expired,
}

/// Container or service type quoted by a tariff
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EquipmentType {
    /// 20' standard dry
    #[sea_orm(string_value = "20ST")]
    #[serde(rename = "20ST")]
    Standard20,
    /// 40' standard dry
    #[sea_orm(string_value = "40ST")]
    #[serde(rename = "40ST")]
    Standard40,
    /// 40' high cube
    #[sea_orm(string_value = "40HC")]
    #[serde(rename = "40HC")]
    HighCube40,
    /// 45' high cube
    #[sea_orm(string_value = "45HC")]
    #[serde(rename = "45HC")]
    HighCube45,
    /// 20' reefer
    #[sea_orm(string_value = "20RF")]
    #[serde(rename = "20RF")]
    Reefer20,
    /// 40' reefer
    #[sea_orm(string_value = "40RF")]
    #[serde(rename = "40RF")]
    Reefer40,
    /// 40' high cube reefer
    #[sea_orm(string_value = "40RH")]
    #[serde(rename = "40RH")]
    ReeferHighCube40,
    /// 40' non-operating reefer
    #[sea_orm(string_value = "40NOR")]
    #[serde(rename = "40NOR")]
    NonOperatingReefer40,
    /// 20' open top
    #[sea_orm(string_value = "20OT")]
    #[serde(rename = "20OT")]
    OpenTop20,
    /// 40' open top
    #[sea_orm(string_value = "40OT")]
    #[serde(rename = "40OT")]
    OpenTop40,
    /// 20' flat rack
    #[sea_orm(string_value = "20FR")]
    #[serde(rename = "20FR")]
    FlatRack20,
    /// 40' flat rack
    #[sea_orm(string_value = "40FR")]
    #[serde(rename = "40FR")]
    FlatRack40,
    /// 20' platform
    #[sea_orm(string_value = "20PL")]
    #[serde(rename = "20PL")]
    Platform20,
    /// 40' platform
    #[sea_orm(string_value = "40PL")]
    #[serde(rename = "40PL")]
    Platform40,
    /// 20' ISO tank
    #[sea_orm(string_value = "20TK")]
    #[serde(rename = "20TK")]
    Tank20,
    /// Flexitank inside a 20' box
    #[sea_orm(string_value = "FLEXI")]
    #[serde(rename = "FLEXI")]
    Flexitank,
    /// 20' ventilated
    #[sea_orm(string_value = "20VH")]
    #[serde(rename = "20VH")]
    Ventilated20,
    /// Less than container load
    #[sea_orm(string_value = "LCL")]
    #[serde(rename = "LCL")]
    Lcl,
    /// Break bulk
    #[sea_orm(string_value = "BB")]
    #[serde(rename = "BB")]
    BreakBulk,
    /// Roll-on/roll-off
    #[sea_orm(string_value = "RORO")]
    #[serde(rename = "RORO")]
    RoRo,
    /// 53' domestic trailer
    #[sea_orm(string_value = "53FT")]
    #[serde(rename = "53FT")]
    Trailer53,
    /// Full truck load
    #[sea_orm(string_value = "FTL")]
    #[serde(rename = "FTL")]
    FullTruckLoad,
    /// Less than truck load
    #[sea_orm(string_value = "LTL")]
    #[serde(rename = "LTL")]
    LessTruckLoad,
    /// Rail container
    #[sea_orm(string_value = "RAIL")]
    #[serde(rename = "RAIL")]
    Rail,
    /// Air freight
    #[sea_orm(string_value = "AIR")]
    #[serde(rename = "AIR")]
    Air,
}

impl EquipmentType {
    /// Short code as stored in the database (e.g. `"40HC"`)
    #[must_use]
    pub fn code(self) -> String {
        self.to_value()
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl FromStr for EquipmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::iter()
            .find(|equipment| equipment.to_value() == wanted)
            .ok_or_else(|| format!("unknown equipment code `{s}`"))
    }
}

/// Tariff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    /// Surrogate identifier; ascending ids follow insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Directory id of the quoting forwarder
    pub forwarder_id: i64,
    /// Directory id of the shipping line, if known
    pub carrier_id: Option<i64>,
    /// Directory id of the port of loading
    pub origin_port_id: i64,
    /// Directory id of the port of discharge
    pub destination_port_id: i64,
    /// Directory id of the destination country, if recorded
    pub country_id: Option<i64>,
    /// ISO currency code shared by every cost component
    pub currency: String,
    /// Validity year in canonical decimal form (legacy rows may hold other text)
    pub year: String,
    /// Comma-joined, calendar-sorted month codes (e.g. `"01,02,03"`)
    pub months: String,
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
    /// Sum of all present cost components
    pub all_in_total: f64,
    /// Non-ocean costs as a percentage of ocean freight
    pub surcharge_pct: f64,
    /// Display label built from forwarder, lane and period
    pub route_label: String,
    /// Validity state as of the last write
    pub state: TariffState,
    /// Quoted equipment
    pub equipment_type: EquipmentType,
    /// Port-to-port transit time
    pub transit_time_days: i32,
    /// Free demurrage/detention days
    pub free_time_days: i32,
    /// Free-text remarks
    pub notes: Option<String>,
    /// Date the quote was issued
    pub tariff_date: Date,
    /// Soft delete flag - archived tariffs are hidden from every report
    pub is_archived: bool,
    /// When the tariff was created
    pub created_at: DateTime,
    /// When the tariff was last modified
    pub updated_at: DateTime,
}

/// Directory references are weak, so no relations are declared
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
