use std::collections::HashMap;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crime_lens::data::clean::CleanReport;

/// Shape, raw preview and missing-value counts at each cleaning step.
pub fn data_overview(ui: &mut Ui, report: &CleanReport) {
    egui::CollapsingHeader::new(RichText::new("Data overview").strong())
        .id_salt("data_overview")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let (rows, cols) = report.raw_shape;
            ui.label(format!("Shape of the raw table: ({rows}, {cols})"));

            ui.add_space(4.0);
            ui.strong("Raw data preview");
            raw_preview(ui, report);

            ui.add_space(4.0);
            if report.dropped_columns.is_empty() {
                ui.label("No columns dropped.");
            } else {
                ui.label(format!("Dropped columns: {}", report.dropped_columns.join(", ")));
            }
            ui.label(format!(
                "Rows removed for missing victim sex or weapon: {}",
                report.rows_missing_required
            ));
            ui.label(format!(
                "Rows removed for unparseable dates: {}",
                report.rows_bad_date
            ));
            for err in &report.date_errors {
                ui.label(RichText::new(err.to_string()).weak());
            }
            ui.label(format!("Incidents after cleaning: {}", report.final_rows));

            ui.add_space(4.0);
            ui.strong("Missing values per column");
            missing_grid(ui, report);
        });
}

fn raw_preview(ui: &mut Ui, report: &CleanReport) {
    egui::ScrollArea::horizontal()
        .id_salt("raw_preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), report.preview_columns.len())
                .header(20.0, |mut header| {
                    for col in &report.preview_columns {
                        header.col(|ui| {
                            ui.strong(col.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for row in &report.preview_rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui| {
                                    ui.label(cell.as_str());
                                });
                            }
                        });
                    }
                });
        });
}

/// One row per raw column; `-` where the column was already dropped.
fn missing_grid(ui: &mut Ui, report: &CleanReport) {
    let after_drop: HashMap<&str, usize> = report
        .missing_after_drop
        .iter()
        .map(|(c, n)| (c.as_str(), *n))
        .collect();
    let after_clean: HashMap<&str, usize> = report
        .missing_after_clean
        .iter()
        .map(|(c, n)| (c.as_str(), *n))
        .collect();
    let cell = |m: &HashMap<&str, usize>, col: &str| {
        m.get(col).map_or_else(|| "-".to_string(), |n| n.to_string())
    };

    egui::Grid::new("missing_values")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Column");
            ui.strong("Raw");
            ui.strong("After dropping columns");
            ui.strong("After cleaning");
            ui.end_row();

            for (col, raw) in &report.missing_raw {
                ui.label(col.as_str());
                ui.label(raw.to_string());
                ui.label(cell(&after_drop, col.as_str()));
                ui.label(cell(&after_clean, col.as_str()));
                ui.end_row();
            }
        });
}
