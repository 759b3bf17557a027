//! Application settings loading from config.toml
//!
//! Every key is optional; missing keys fall back to the defaults used by the
//! dashboard (top 5 rankings, 6 trend buckets, the standard alert thresholds and
//! the four common equipment types for the comparison table).

use crate::entities::EquipmentType;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency assigned to tariffs created without one
    pub default_currency: String,
    /// KPI engine parameters
    pub kpi: KpiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            kpi: KpiSettings::default(),
        }
    }
}

/// Parameters of the KPI aggregation engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KpiSettings {
    /// Length of the forwarder, carrier and route rankings
    pub top_n: usize,
    /// Number of monthly trend buckets in the dashboard
    pub trend_months: usize,
    /// Expired tariff count above which an info alert is raised
    pub expired_alert_threshold: usize,
    /// Minimum number of forwarders with active tariffs before a danger alert
    pub min_active_forwarders: usize,
    /// Variation (in percent) beyond which the trend counts as a rise or fall
    pub variation_threshold_pct: f64,
    /// Equipment types shown in the comparison table
    pub common_equipment: Vec<EquipmentType>,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            trend_months: 6,
            expired_alert_threshold: 10,
            min_active_forwarders: 3,
            variation_threshold_pct: 5.0,
            common_equipment: vec![
                EquipmentType::Standard20,
                EquipmentType::Standard40,
                EquipmentType::HighCube40,
                EquipmentType::Lcl,
            ],
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A key has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading settings from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from ./config.toml, or the defaults when the file does not exist
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}
