use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, maps, overview, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CrimeLensApp {
    pub state: AppState,
}

impl eframe::App for CrimeLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and maps ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.state.session else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open an incident file to begin  (File → Open…)");
                });
                return;
            };
            let result = session.result();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Crime Incident Dashboard");
                    overview::data_overview(ui, &session.report);
                    ui.separator();

                    charts::trend_chart(ui, &result.trend);
                    charts::area_chart(ui, &result.by_area);
                    charts::age_chart(ui, &result.by_age_group);
                    charts::weapon_chart(ui, &result.by_weapon);
                    charts::correlation_heatmap(ui, result.correlation.as_ref());

                    maps::point_map(ui, &result.points);
                    maps::frequency_map(
                        ui,
                        result.frequency_map.as_ref(),
                        session.table.has_coordinates,
                    );
                });
        });
    }
}
