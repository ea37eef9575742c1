use std::collections::BTreeSet;
use std::sync::Arc;

use crime_lens::data::model::AgeGroup;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(session) = &mut state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    // The table is immutable; hold our own handle so the params can be
    // borrowed mutably alongside it.
    let table = Arc::clone(&session.table);
    let params = &mut session.params;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let months: Vec<(u32, String)> = (1..=12u32)
                .map(|m| (m, format!("{m:>2}  {}", MONTH_NAMES[m as usize - 1])))
                .collect();
            multi_select(ui, "Month", &months, &mut params.months);

            let areas: Vec<(String, String)> =
                table.areas.iter().map(|a| (a.clone(), a.clone())).collect();
            multi_select(ui, "Area", &areas, &mut params.areas);

            let groups: Vec<(AgeGroup, String)> = AgeGroup::ALL
                .iter()
                .map(|g| (*g, g.label().to_string()))
                .collect();
            multi_select(ui, "Age group", &groups, &mut params.age_groups);
            ui.checkbox(&mut params.include_unknown_age, "Include unknown ages");

            let weapons: Vec<(String, String)> = table
                .top_weapons
                .iter()
                .map(|w| (w.clone(), w.clone()))
                .collect();
            multi_select(ui, "Weapon", &weapons, &mut params.weapons);
        });

    // Recompute after any checkbox changes; a no-op when nothing changed.
    state.refresh();
}

/// Collapsible checkbox list with All/None buttons for one dimension.
fn multi_select<T: Ord + Clone>(
    ui: &mut Ui,
    title: &str,
    options: &[(T, String)],
    selected: &mut BTreeSet<T>,
) {
    let n_selected = options.iter().filter(|(v, _)| selected.contains(v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    selected.extend(options.iter().map(|(v, _)| v.clone()));
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                }
            });

            for (value, label) in options {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, label.as_str()).changed() {
                    if checked {
                        selected.insert(value.clone());
                    } else {
                        selected.remove(value);
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &mut state.session {
            ui.label(format!(
                "{} incidents loaded, {} match",
                session.table.len(),
                session.result().filtered_count
            ));
            if ui.small_button("Reset filters").clicked() {
                session.select_all();
            }
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open incident data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
