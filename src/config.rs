use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Environment variable holding the path of an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "CRIME_LENS_CONFIG";

/// Columns the dashboard never looks at.
pub const DEFAULT_COLUMNS_TO_DROP: &[&str] = &[
    "division_number",
    "crime_code",
    "area",
    "crime_code_1",
    "crime_code_2",
    "crime_code_3",
    "crime_code_4",
    "status_description",
    "status",
    "weapon_code",
    "premise_code",
    "premise_description",
    "victim_descent",
    "modus_operandi",
    "cross_street",
];

/// What to do with a row whose `date_occurred` or `date_reported` cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateParsePolicy {
    /// Remove the row and keep a sample of the failure in the clean report.
    #[default]
    Drop,
    /// Abort loading on the first failure.
    Fail,
}

/// Tunables for loading, cleaning and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub columns_to_drop: Vec<String>,
    /// Report a [`crate::error::SchemaError`] when a drop column is absent.
    pub strict_drop: bool,
    /// Field delimiter for text files; `None` picks by extension.
    pub delimiter: Option<char>,
    pub date_policy: DateParsePolicy,
    /// How many of the most frequent weapons become filter options.
    pub top_weapons: usize,
    pub high_quantile: f64,
    pub medium_quantile: f64,
    /// Radius of the frequency-map markers, in metres.
    pub marker_radius_m: f64,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns_to_drop: DEFAULT_COLUMNS_TO_DROP
                .iter()
                .map(|c| c.to_string())
                .collect(),
            strict_drop: false,
            delimiter: None,
            date_policy: DateParsePolicy::Drop,
            top_weapons: 10,
            high_quantile: 0.67,
            medium_quantile: 0.33,
            marker_radius_m: 700.0,
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| DashboardError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Defaults, overridden by the file named in [`CONFIG_ENV_VAR`] when set.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = Path::new(&path);
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}
