//! Headless run of the dashboard pipeline: `summarize PATH`.
//!
//! Loads and cleans the file, recomputes with every filter option selected
//! and prints the result as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use crime_lens::{load_dataset, DashboardConfig, Session};

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: summarize PATH")?;

    let config = DashboardConfig::from_env()?;
    let dataset = load_dataset(&path, &config)
        .with_context(|| format!("loading {}", path.display()))?;
    let session = Session::new(dataset, config);

    let json = serde_json::to_string_pretty(session.result()).context("serializing result")?;
    println!("{json}");
    Ok(())
}
