use std::path::{Path, PathBuf};

use crime_lens::{load_dataset, DashboardConfig, Session};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded session (None until a file loads successfully).
    pub session: Option<Session>,

    pub config: DashboardConfig,

    /// File the current session was loaded from.
    pub source: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load a file into a fresh session. On failure the previous session is
    /// discarded so no partial dashboard is shown.
    pub fn load_path(&mut self, path: &Path) {
        match load_dataset(path, &self.config) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} incidents from {}",
                    dataset.table.len(),
                    path.display()
                );
                self.session = Some(Session::new(dataset, self.config.clone()));
                self.source = Some(path.to_path_buf());
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.session = None;
                self.source = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the dashboard if the controls changed anything.
    pub fn refresh(&mut self) {
        if let Some(session) = &mut self.session {
            session.refresh();
        }
    }
}
