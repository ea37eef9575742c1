//! Crime incident dashboard: load an incident table, clean it, filter it by
//! month, area, victim age group and weapon, and aggregate the result for
//! charts and maps.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod session;

pub use config::DashboardConfig;
pub use data::filter::FilterParams;
pub use data::{load_dataset, Dataset};
pub use error::{DashboardError, DataLoadError, DateParseError, SchemaError};
pub use session::{recompute, DashboardResult, Session};
