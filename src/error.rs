use std::path::PathBuf;

use thiserror::Error;

/// The source table could not be read or lacks columns the dashboard needs.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow conversion failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("required column '{0}' is missing")]
    MissingColumn(String),
}

/// A column named for dropping is not part of the table.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("cannot drop column '{0}': not present in the table")]
    UnknownColumn(String),
}

/// A date cell that none of the accepted formats could parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("row {row}: cannot parse {column} value '{value}' as a date")]
pub struct DateParseError {
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Everything that can stop the table from reaching the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
