use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crime_lens::color::{self, AGE_BAR_COLOR, TREND_LINE_COLOR, WEAPON_BAR_COLOR};
use crime_lens::data::aggregate::{CategoryCount, TrendPoint};
use crime_lens::data::model::AgeGroup;
use crime_lens::data::stats::CorrelationMatrix;

const CHART_HEIGHT: f32 = 280.0;

fn empty_notice(ui: &mut Ui) {
    ui.label(egui::RichText::new("No incidents match the current filters.").italics());
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// Incidents per month. Points of different years share the month axis.
pub fn trend_chart(ui: &mut Ui, trend: &[TrendPoint]) {
    ui.heading("Crime Trend Over Time");
    if trend.is_empty() {
        empty_notice(ui);
        return;
    }

    let series: Vec<[f64; 2]> = trend
        .iter()
        .map(|p| [f64::from(p.month), p.count as f64])
        .collect();

    Plot::new("trend_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Number of Crimes")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let line: PlotPoints = series.iter().copied().collect();
            plot_ui.line(Line::new(line).color(TREND_LINE_COLOR).width(2.0));
            let markers: PlotPoints = series.iter().copied().collect();
            plot_ui.points(Points::new(markers).color(TREND_LINE_COLOR).radius(3.5));
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Categorical bar chart with the category labels on the x axis.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    entries: Vec<(String, usize, Color32)>,
) {
    if entries.is_empty() {
        empty_notice(ui);
        return;
    }

    let labels: Vec<String> = entries.iter().map(|(l, _, _)| l.clone()).collect();
    let bars: Vec<Bar> = entries
        .into_iter()
        .enumerate()
        .map(|(i, (label, count, fill))| {
            Bar::new(i as f64, count as f64)
                .name(label)
                .fill(fill)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Incidents per area, colored by count.
pub fn area_chart(ui: &mut Ui, counts: &[CategoryCount<String>]) {
    ui.heading("Crime Distribution by Area");
    let min = counts.iter().map(|c| c.count).min().unwrap_or(0) as f64;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;
    let entries = counts
        .iter()
        .map(|c| (c.key.clone(), c.count, color::viridis(c.count as f64, min, max)))
        .collect();
    category_bars(ui, "area_chart", "Area", "Crime Count", entries);
}

pub fn age_chart(ui: &mut Ui, counts: &[CategoryCount<AgeGroup>]) {
    ui.heading("Age-Wise Crime Distribution");
    let entries = counts
        .iter()
        .map(|c| (c.key.label().to_string(), c.count, AGE_BAR_COLOR))
        .collect();
    category_bars(ui, "age_chart", "Age Group", "Number of Crimes", entries);
}

pub fn weapon_chart(ui: &mut Ui, counts: &[CategoryCount<String>]) {
    ui.heading("Top 10 Weapon Types Used in Crimes");
    let entries = counts
        .iter()
        .map(|c| (c.key.clone(), c.count, WEAPON_BAR_COLOR))
        .collect();
    category_bars(ui, "weapon_chart", "Weapon Type", "Number of Crimes", entries);
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

const CELL: Vec2 = Vec2::new(64.0, 28.0);
const ROW_LABEL_WIDTH: f32 = 130.0;
const HEADER_HEIGHT: f32 = 24.0;

/// Annotated correlation heatmap, coolwarm colored.
pub fn correlation_heatmap(ui: &mut Ui, matrix: Option<&CorrelationMatrix>) {
    ui.heading("Correlation Matrix");
    let Some(matrix) = matrix else {
        ui.label(egui::RichText::new("Insufficient data for a correlation matrix.").italics());
        return;
    };

    let n = matrix.columns.len();
    let size = Vec2::new(
        ROW_LABEL_WIDTH + CELL.x * n as f32,
        HEADER_HEIGHT + CELL.y * n as f32,
    );
    let (rect, _response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (j, name) in matrix.columns.iter().enumerate() {
        let center = rect.left_top()
            + Vec2::new(
                ROW_LABEL_WIDTH + CELL.x * (j as f32 + 0.5),
                HEADER_HEIGHT / 2.0,
            );
        painter.text(center, Align2::CENTER_CENTER, short(name), font.clone(), text_color);
    }

    for (i, name) in matrix.columns.iter().enumerate() {
        let row_top = HEADER_HEIGHT + CELL.y * i as f32;
        painter.text(
            rect.left_top() + Vec2::new(ROW_LABEL_WIDTH - 6.0, row_top + CELL.y / 2.0),
            Align2::RIGHT_CENTER,
            name,
            font.clone(),
            text_color,
        );
        for j in 0..n {
            let r = matrix.get(i, j);
            let min = rect.left_top() + Vec2::new(ROW_LABEL_WIDTH + CELL.x * j as f32, row_top);
            let cell = egui::Rect::from_min_size(min, CELL);
            painter.rect_filled(cell.shrink(1.0), 0.0, color::coolwarm(r));
            let label = if r.is_nan() {
                "nan".to_string()
            } else {
                format!("{r:.2}")
            };
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                label,
                font.clone(),
                Color32::BLACK,
            );
        }
    }

    ui.label(egui::RichText::new(format!("{} complete rows", matrix.sample_size)).weak());
}

/// Column header that fits a heatmap cell.
fn short(name: &str) -> String {
    const MAX: usize = 9;
    if name.chars().count() <= MAX {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX - 1).collect();
        format!("{head}…")
    }
}
