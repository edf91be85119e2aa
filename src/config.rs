use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub accrual: AccrualConfig,
    pub projection: ProjectionConfig,
    pub presentation: PresentationConfig,
    pub store: StoreConfig,
}

/// interest accrual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualConfig {
    /// days per year in the simple-interest fraction
    pub year_basis: u32,
}

/// settlement projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// hard iteration cap for the forward simulation
    pub max_months: u32,
    /// fixed day count per simulated month
    pub days_per_month: u32,
    /// row cap for the short preview
    pub preview_months: u32,
}

/// display and export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub decimal_places: u32,
    /// `end_date` format, "DD Mon YYYY"
    pub date_format: String,
    /// `calculated_at` format
    pub timestamp_format: String,
    /// plan length assumed when a request omits repayments
    pub default_plan_months: usize,
}

/// schedule blob storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub directory: PathBuf,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self { year_basis: 365 }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_months: 120,
            days_per_month: 30,
            preview_months: 12,
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            date_format: "%d %b %Y".to_string(),
            timestamp_format: "%d %b %Y %H:%M:%S".to_string(),
            default_plan_months: 12,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("balances"),
        }
    }
}

impl EngineConfig {
    /// load overrides from a json file; absent keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        log::info!("loaded engine config from {}", path.as_ref().display());
        Ok(config)
    }

    /// same settings with the store rooted elsewhere
    pub fn with_store_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.store.directory = directory.into();
        self
    }
}
