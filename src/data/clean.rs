use serde::Serialize;

use super::model::RawTable;
use crate::config::DashboardConfig;
use crate::error::{DataLoadError, DateParseError, Result, SchemaError};

/// Columns every later stage reads.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "date_occurred",
    "date_reported",
    "area_name",
    "victim_age",
    "victim_sex",
    "weapon_description",
];

/// Rows with a null in any of these are removed.
pub const NON_NULL_COLUMNS: &[&str] = &["victim_sex", "weapon_description"];

/// How many date failures are kept in the report.
const DATE_ERROR_SAMPLES: usize = 5;

/// What cleaning did to the table, for the "Data overview" section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    /// `(rows, columns)` as loaded.
    pub raw_shape: (usize, usize),
    pub preview_columns: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
    pub missing_raw: Vec<(String, usize)>,
    /// Drop-list columns that were present and removed.
    pub dropped_columns: Vec<String>,
    pub missing_after_drop: Vec<(String, usize)>,
    pub rows_missing_required: usize,
    pub missing_after_clean: Vec<(String, usize)>,
    pub rows_bad_date: usize,
    #[serde(skip)]
    pub date_errors: Vec<DateParseError>,
    pub final_rows: usize,
}

impl CleanReport {
    pub(crate) fn record_date_error(&mut self, err: DateParseError) {
        self.rows_bad_date += 1;
        if self.date_errors.len() < DATE_ERROR_SAMPLES {
            self.date_errors.push(err);
        }
    }
}

/// Drop the configured columns, check the required ones and remove rows
/// with a null in [`NON_NULL_COLUMNS`].
pub fn clean(mut raw: RawTable, config: &DashboardConfig) -> Result<(RawTable, CleanReport)> {
    let mut report = CleanReport {
        raw_shape: raw.shape(),
        preview_columns: raw.columns.clone(),
        preview_rows: raw.preview(config.preview_rows),
        missing_raw: raw.missing_counts(),
        ..CleanReport::default()
    };

    for col in &config.columns_to_drop {
        if report.dropped_columns.contains(col) {
            continue;
        }
        if raw.drop_column(col) {
            report.dropped_columns.push(col.clone());
        } else if config.strict_drop {
            return Err(SchemaError::UnknownColumn(col.clone()).into());
        } else {
            log::debug!("Column '{col}' is not in the table, nothing to drop");
        }
    }
    report.missing_after_drop = raw.missing_counts();

    for required in REQUIRED_COLUMNS {
        if raw.column_index(required).is_none() {
            return Err(DataLoadError::MissingColumn(required.to_string()).into());
        }
    }

    let non_null: Vec<usize> = NON_NULL_COLUMNS
        .iter()
        .filter_map(|c| raw.column_index(c))
        .collect();
    let before = raw.rows.len();
    raw.rows
        .retain(|row| non_null.iter().all(|&i| row.get(i).is_some_and(|c| !c.is_null())));
    report.rows_missing_required = before - raw.rows.len();
    if report.rows_missing_required > 0 {
        log::warn!(
            "Removed {} rows with missing {}",
            report.rows_missing_required,
            NON_NULL_COLUMNS.join(" or ")
        );
    }
    report.missing_after_clean = raw.missing_counts();

    Ok((raw, report))
}
