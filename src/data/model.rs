use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell; `None` for text, booleans and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view; floats with no fractional part count too.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text view; numbers are rendered, null stays `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file as loaded, before cleaning
// ---------------------------------------------------------------------------

/// Row-major table of untyped cells with an ordered header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Null count per column, in header order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let nulls = self
                    .rows
                    .iter()
                    .filter(|row| row.get(i).map_or(true, CellValue::is_null))
                    .count();
                (col.clone(), nulls)
            })
            .collect()
    }

    /// Remove a column and its cells. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
        true
    }

    /// First `n` rows rendered as strings, for previews.
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(n)
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// AgeGroup – bucketed victim age
// ---------------------------------------------------------------------------

/// Victim age bucket over the edges `[0, 18, 35, 50, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0-18")]
    Minor,
    #[serde(rename = "19-35")]
    YoungAdult,
    #[serde(rename = "36-50")]
    Adult,
    #[serde(rename = "51+")]
    Senior,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Minor,
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::Senior,
    ];

    /// Bucket an age. The first bin is closed on both ends, the rest are
    /// right-closed; anything outside `[0, 100]` has no group.
    pub fn from_age(age: i64) -> Option<Self> {
        match age {
            0..=18 => Some(AgeGroup::Minor),
            19..=35 => Some(AgeGroup::YoungAdult),
            36..=50 => Some(AgeGroup::Adult),
            51..=100 => Some(AgeGroup::Senior),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Minor => "0-18",
            AgeGroup::YoungAdult => "19-35",
            AgeGroup::Adult => "36-50",
            AgeGroup::Senior => "51+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Incident – one cleaned row with derived features
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub date_occurred: NaiveDateTime,
    pub date_reported: NaiveDateTime,
    /// 1-12, from `date_occurred`.
    pub month: u32,
    pub year: i32,
    pub area_name: Option<String>,
    pub victim_age: Option<i64>,
    pub age_group: Option<AgeGroup>,
    pub victim_sex: String,
    pub weapon_description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Aligned with [`IncidentTable::numeric_columns`].
    pub numeric: Vec<Option<f64>>,
}

impl Incident {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// IncidentTable – the cleaned dataset shared by a session
// ---------------------------------------------------------------------------

/// The cleaned, feature-derived dataset. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentTable {
    pub incidents: Vec<Incident>,
    /// Names of the numeric columns, `month` and `year` last.
    pub numeric_columns: Vec<String>,
    /// Whether the source had both `latitude` and `longitude`.
    pub has_coordinates: bool,
    /// Distinct area names in order of first appearance.
    pub areas: Vec<String>,
    /// Most frequent weapons over the whole table, most frequent first.
    pub top_weapons: Vec<String>,
}

impl IncidentTable {
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}
