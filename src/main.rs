mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::CrimeLensApp;
use crime_lens::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let (config, config_error) = match DashboardConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("{e}");
            (DashboardConfig::default(), Some(format!("Error: {e}")))
        }
    };

    let mut state = AppState::new(config);
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.load_path(&path);
    }
    if config_error.is_some() {
        state.status_message = config_error;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Crime Lens – Incident Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CrimeLensApp { state }))),
    )
}
