//! Data layer: loading, cleaning, feature derivation, filtering, aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .parquet / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → RawTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  clean   │  drop columns, drop rows missing sex/weapon → CleanReport
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ features │  dates, month/year, age groups → IncidentTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  apply FilterParams → filtered view
//!   └──────────┘
//!        │
//!        ▼
//!   aggregate / stats / geo   grouped counts, correlation, maps
//! ```

pub mod aggregate;
pub mod clean;
pub mod features;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
pub mod stats;

use std::path::Path;

use crate::config::DashboardConfig;
use crate::error::Result;
use clean::CleanReport;
use model::{IncidentTable, RawTable};

/// A cleaned table plus the record of how it was cleaned.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: IncidentTable,
    pub report: CleanReport,
}

/// Clean an already loaded table and derive its features.
pub fn prepare(raw: RawTable, config: &DashboardConfig) -> Result<Dataset> {
    let (cleaned, mut report) = clean::clean(raw, config)?;
    let table = features::derive_features(&cleaned, config, &mut report)?;
    log::info!(
        "Prepared {} incidents across {} areas",
        table.len(),
        table.areas.len()
    );
    Ok(Dataset { table, report })
}

/// Load, clean and derive features for a file.
pub fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<Dataset> {
    let raw = loader::load_file(path, config.delimiter)?;
    prepare(raw, config)
}
