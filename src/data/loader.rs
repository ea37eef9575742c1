use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};
use crate::error::DataLoadError;

/// Tokens that read as a missing value in text files (the pandas NA set).
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Categorical columns whose labels are kept exactly as written.
pub const TEXT_COLUMNS: &[&str] = &["area_name", "victim_sex", "weapon_description"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited text with a header row
/// * `.tsv`          – tab-delimited text with a header row
/// * `.parquet`      – flat Parquet file
/// * `.json`         – `[{ "column": value, ... }, ...]`
///
/// `delimiter` overrides the separator of text files.
pub fn load_file(path: &Path, delimiter: Option<char>) -> Result<RawTable, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, delimiter.unwrap_or(',')),
        "tsv" => load_delimited(path, delimiter.unwrap_or('\t')),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(DataLoadError::UnsupportedExtension(other.to_string())),
    }?;

    let (rows, cols) = table.shape();
    log::info!("Loaded {} with {rows} rows and {cols} columns", path.display());
    Ok(table)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: char) -> Result<RawTable, DataLoadError> {
    let file = open(path)?;
    read_delimited(file, delimiter)
}

/// Parse delimited text from any reader.
///
/// Types are inferred per column: a column is integer or float only when
/// every non-null cell parses as one. Columns in [`TEXT_COLUMNS`] are never
/// converted.
pub fn read_delimited<R: std::io::Read>(
    reader: R,
    delimiter: char,
) -> Result<RawTable, DataLoadError> {
    let delimiter = u8::try_from(delimiter).map_err(|_| DataLoadError::MalformedRow {
        row: 0,
        reason: format!("delimiter '{delimiter}' is not a single-byte character"),
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }

    let kinds: Vec<ColumnKind> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if TEXT_COLUMNS.contains(&name.as_str()) {
                ColumnKind::Text
            } else {
                ColumnKind::infer(records.iter().filter_map(|r| r.get(i)))
            }
        })
        .collect();

    let mut table = RawTable::new(columns);
    table.rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&kinds)
                .map(|(s, kind)| kind.cell(s))
                .collect()
        })
        .collect();

    Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    /// Narrowest kind every non-null value fits. All-null columns are text.
    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for s in values.map(str::trim).filter(|s| !is_null_token(s)) {
            let this = if s.parse::<i64>().is_ok() {
                ColumnKind::Integer
            } else if parse_finite(s).is_some() {
                ColumnKind::Float
            } else if s == "true" || s == "false" {
                ColumnKind::Bool
            } else {
                return ColumnKind::Text;
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                _ => return ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Text)
    }

    fn cell(self, s: &str) -> CellValue {
        let s = s.trim();
        if is_null_token(s) {
            return CellValue::Null;
        }
        let parsed = match self {
            ColumnKind::Integer => s.parse().ok().map(CellValue::Integer),
            ColumnKind::Float => parse_finite(s).map(CellValue::Float),
            ColumnKind::Bool => Some(CellValue::Bool(s == "true")),
            ColumnKind::Text => None,
        };
        parsed.unwrap_or_else(|| CellValue::Text(s.to_string()))
    }
}

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s)
}

/// Float parse that leaves `inf`, `infinity` and overflowing literals as text.
fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "area_name": "Central", "victim_age": 31, "latitude": 34.05 },
///   ...
/// ]
/// ```
///
/// The header is the union of keys in first-seen order; absent keys are null.
/// JSON strings stay text.
fn load_json(path: &Path) -> Result<RawTable, DataLoadError> {
    let file = open(path)?;
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(file))?;

    let records = root.as_array().ok_or_else(|| DataLoadError::MalformedRow {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DataLoadError::MalformedRow {
            row: i,
            reason: "not a JSON object".to_string(),
        })?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(columns);
    for rec in records {
        // Every record was checked to be an object above.
        let Some(obj) = rec.as_object() else { continue };
        let row = table
            .columns
            .iter()
            .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
            .collect();
        table.rows.push(row);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if is_null_token(s.trim()) => CellValue::Null,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// Integer and float columns become numbers, strings become text and every
/// other Arrow type (timestamps, dates, decimals, ...) is formatted to text
/// so the date parser can pick it up.
fn load_parquet(path: &Path) -> Result<RawTable, DataLoadError> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut table = RawTable::new(columns);

    for batch_result in reader {
        let batch = batch_result?;
        let first_row = table.rows.len();
        table
            .rows
            .extend((0..batch.num_rows()).map(|_| Vec::with_capacity(batch.num_columns())));

        for col in batch.columns() {
            let cells = column_cells(col)?;
            for (offset, cell) in cells.into_iter().enumerate() {
                table.rows[first_row + offset].push(cell);
            }
        }
    }

    Ok(table)
}

// -- Arrow helpers --

/// Convert one Arrow column into cells, row by row.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>, DataLoadError> {
    macro_rules! ints {
        ($t:ty) => {{
            let arr = col.as_primitive::<$t>();
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Integer(arr.value(i) as i64)
                    }
                })
                .collect()
        }};
    }
    macro_rules! floats {
        ($t:ty) => {{
            let arr = col.as_primitive::<$t>();
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) || arr.value(i).is_nan() {
                        CellValue::Null
                    } else {
                        CellValue::Float(arr.value(i) as f64)
                    }
                })
                .collect()
        }};
    }

    let cells = match col.data_type() {
        DataType::Int8 => ints!(Int8Type),
        DataType::Int16 => ints!(Int16Type),
        DataType::Int32 => ints!(Int32Type),
        DataType::Int64 => ints!(Int64Type),
        DataType::UInt8 => ints!(UInt8Type),
        DataType::UInt16 => ints!(UInt16Type),
        DataType::UInt32 => ints!(UInt32Type),
        DataType::Float32 => floats!(Float32Type),
        DataType::Float64 => floats!(Float64Type),
        DataType::Utf8 => string_cells(col.as_string::<i32>().iter()),
        DataType::LargeUtf8 => string_cells(col.as_string::<i64>().iter()),
        DataType::Boolean => col
            .as_boolean()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Bool))
            .collect(),
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
            (0..col.len())
                .map(|i| {
                    if col.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

fn string_cells<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<CellValue> {
    values
        .map(|v| match v {
            Some(s) if !s.is_empty() => CellValue::Text(s.to_string()),
            _ => CellValue::Null,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_cells_are_typed() {
        let text = "area_name,victim_age,latitude,note\nCentral,31,34.05,\nHollywood,,NaN,x\n";
        let table = read_delimited(text.as_bytes(), ',').unwrap();

        assert_eq!(table.columns, vec!["area_name", "victim_age", "latitude", "note"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Text("Central".into()),
                CellValue::Integer(31),
                CellValue::Float(34.05),
                CellValue::Null,
            ]
        );
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn tab_delimiter() {
        let text = "a\tb\n1\tfoo\n";
        let table = read_delimited(text.as_bytes(), '\t').unwrap();
        assert_eq!(table.shape(), (1, 2));
        assert_eq!(table.rows[0][1], CellValue::Text("foo".into()));
    }

    #[test]
    fn categorical_labels_keep_their_spelling() {
        let text = "area_name,weapon_description,victim_sex,code\nInf,007,1.50,007\nCentral,KNIFE,M,12\n";
        let table = read_delimited(text.as_bytes(), ',').unwrap();

        assert_eq!(table.rows[0][0], CellValue::Text("Inf".into()));
        assert_eq!(table.rows[0][1], CellValue::Text("007".into()));
        assert_eq!(table.rows[0][2], CellValue::Text("1.50".into()));
        assert_eq!(table.rows[0][3], CellValue::Integer(7));
    }

    #[test]
    fn mixed_column_stays_text() {
        let text = "label,x\n007,inf\nabc,1e3\n";
        let table = read_delimited(text.as_bytes(), ',').unwrap();

        assert_eq!(table.rows[0][0], CellValue::Text("007".into()));
        assert_eq!(table.rows[0][1], CellValue::Text("inf".into()));
        assert_eq!(table.rows[1][1], CellValue::Text("1e3".into()));
    }

    #[test]
    fn integer_and_float_cells_widen_to_float() {
        let text = "latitude\n34\n34.5\n";
        let table = read_delimited(text.as_bytes(), ',').unwrap();
        assert_eq!(table.rows[0][0], CellValue::Float(34.0));
        assert_eq!(table.rows[1][0], CellValue::Float(34.5));
    }

    #[test]
    fn pandas_null_tokens() {
        let text = "victim_sex,victim_age\nNA,N/A\n#N/A,None\nF,-nan\n";
        let table = read_delimited(text.as_bytes(), ',').unwrap();
        assert_eq!(table.rows[0], vec![CellValue::Null, CellValue::Null]);
        assert_eq!(table.rows[1], vec![CellValue::Null, CellValue::Null]);
        assert_eq!(table.rows[2], vec![CellValue::Text("F".into()), CellValue::Null]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let text = "a,b\n1,2,3\n";
        let err = read_delimited(text.as_bytes(), ',').unwrap_err();
        assert!(matches!(err, DataLoadError::Csv(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx"), None).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn json_records_union_columns() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"area_name": "Central", "victim_age": 30}}, {{"area_name": "77th Street", "latitude": 33.9}}]"#
        )
        .unwrap();

        let table = load_file(file.path(), None).unwrap();
        assert_eq!(table.columns, vec!["area_name", "victim_age", "latitude"]);
        assert_eq!(table.rows[0][2], CellValue::Null);
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Float(33.9));
    }
}
