use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::clean::CleanReport;
use super::model::{AgeGroup, CellValue, Incident, IncidentTable, RawTable};
use crate::config::{DashboardConfig, DateParsePolicy};
use crate::error::{DataLoadError, DateParseError, Result};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse the timestamp layouts found in incident exports.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Turn the cleaned raw table into typed incidents.
///
/// Rows with an unparseable date follow `config.date_policy`. Numeric
/// columns are detected here and `month`/`year` are appended to them.
pub fn derive_features(
    raw: &RawTable,
    config: &DashboardConfig,
    report: &mut CleanReport,
) -> Result<IncidentTable> {
    let idx = |name: &str| {
        raw.column_index(name)
            .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
    };
    let occurred_idx = idx("date_occurred")?;
    let reported_idx = idx("date_reported")?;
    let area_idx = idx("area_name")?;
    let age_idx = idx("victim_age")?;
    let sex_idx = idx("victim_sex")?;
    let weapon_idx = idx("weapon_description")?;
    let lat_idx = raw.column_index("latitude");
    let lon_idx = raw.column_index("longitude");

    let numeric_idx = numeric_column_indices(raw);
    let mut numeric_columns: Vec<String> =
        numeric_idx.iter().map(|&i| raw.columns[i].clone()).collect();
    numeric_columns.push("month".to_string());
    numeric_columns.push("year".to_string());

    let cell = |row: &[CellValue], i: usize| row.get(i).cloned().unwrap_or(CellValue::Null);

    let mut incidents = Vec::with_capacity(raw.rows.len());
    for (row_no, row) in raw.rows.iter().enumerate() {
        let row = row.as_slice();
        let date_occurred = parse_date_cell(&cell(row, occurred_idx), row_no, "date_occurred");
        let date_reported = parse_date_cell(&cell(row, reported_idx), row_no, "date_reported");
        let (date_occurred, date_reported) = match (date_occurred, date_reported) {
            (Ok(o), Ok(r)) => (o, r),
            (Err(e), _) | (_, Err(e)) => match config.date_policy {
                DateParsePolicy::Fail => return Err(e.into()),
                DateParsePolicy::Drop => {
                    log::warn!("Dropping row: {e}");
                    report.record_date_error(e);
                    continue;
                }
            },
        };

        let victim_age = cell(row, age_idx).as_i64();
        let month = date_occurred.month();
        let year = date_occurred.year();

        let mut numeric: Vec<Option<f64>> =
            numeric_idx.iter().map(|&i| cell(row, i).as_f64()).collect();
        numeric.push(Some(f64::from(month)));
        numeric.push(Some(f64::from(year)));

        incidents.push(Incident {
            date_occurred,
            date_reported,
            month,
            year,
            area_name: cell(row, area_idx).as_text(),
            victim_age,
            age_group: victim_age.and_then(AgeGroup::from_age),
            victim_sex: cell(row, sex_idx).as_text().unwrap_or_default(),
            weapon_description: cell(row, weapon_idx).as_text().unwrap_or_default(),
            latitude: lat_idx.and_then(|i| cell(row, i).as_f64()),
            longitude: lon_idx.and_then(|i| cell(row, i).as_f64()),
            numeric,
        });
    }

    if report.rows_bad_date > 0 {
        log::warn!("Removed {} rows with unparseable dates", report.rows_bad_date);
    }
    report.final_rows = incidents.len();

    let areas = distinct_areas(&incidents);
    let top_weapons = top_weapons(&incidents, config.top_weapons);

    Ok(IncidentTable {
        incidents,
        numeric_columns,
        has_coordinates: lat_idx.is_some() && lon_idx.is_some(),
        areas,
        top_weapons,
    })
}

fn parse_date_cell(
    value: &CellValue,
    row: usize,
    column: &str,
) -> std::result::Result<NaiveDateTime, DateParseError> {
    value
        .as_text()
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| DateParseError {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Columns with at least one value where every non-null value is a number.
fn numeric_column_indices(raw: &RawTable) -> Vec<usize> {
    (0..raw.columns.len())
        .filter(|&i| {
            let mut seen = false;
            for row in &raw.rows {
                match row.get(i) {
                    None | Some(CellValue::Null) => {}
                    Some(CellValue::Integer(_) | CellValue::Float(_)) => seen = true,
                    Some(_) => return false,
                }
            }
            seen
        })
        .collect()
}

fn distinct_areas(incidents: &[Incident]) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    for name in incidents.iter().filter_map(|i| i.area_name.as_ref()) {
        if !areas.contains(name) {
            areas.push(name.clone());
        }
    }
    areas
}

/// The `n` most frequent weapons, ties broken by first appearance.
pub fn top_weapons(incidents: &[Incident], n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, inc) in incidents.iter().enumerate() {
        counts
            .entry(inc.weapon_description.as_str())
            .or_insert((0, pos))
            .0 += 1;
    }
    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(n)
        .map(|(w, _)| w.to_string())
        .collect()
}
