use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoints, Points, Polygon};

use crime_lens::color::{frequency_color, frequency_legend};
use crime_lens::data::geo::{AreaMarker, FrequencyMap, GeoPoints};

const MAP_HEIGHT: f32 = 420.0;
const METRES_PER_DEGREE: f64 = 111_320.0;
const CIRCLE_SEGMENTS: usize = 48;

/// Scatter of every filtered incident, longitude on x and latitude on y.
pub fn point_map(ui: &mut Ui, points: &GeoPoints) {
    ui.heading("Crime Hotspots");
    let points = match points {
        GeoPoints::Available(points) => points,
        GeoPoints::Unavailable => {
            ui.label(
                RichText::new("The dataset does not contain 'latitude' and 'longitude' columns.")
                    .color(Color32::RED),
            );
            return;
        }
    };
    if points.is_empty() {
        ui.label(RichText::new("No located incidents match the current filters.").italics());
        return;
    }

    let series: PlotPoints = points.iter().map(|p| [p.longitude, p.latitude]).collect();
    Plot::new("point_map")
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(series)
                    .radius(1.5)
                    .color(Color32::from_rgb(200, 40, 40)),
            );
        });
}

/// One translucent circle per area, colored by crime frequency.
pub fn frequency_map(ui: &mut Ui, map: Option<&FrequencyMap>, has_coordinates: bool) {
    ui.heading("Crime Frequency Map");
    let Some(map) = map else {
        let msg = if has_coordinates {
            "No located incidents match the current filters."
        } else {
            "The dataset does not contain 'latitude' and 'longitude' columns."
        };
        ui.label(RichText::new(msg).italics());
        return;
    };

    Plot::new("frequency_map")
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(map.center.longitude)
        .include_y(map.center.latitude)
        .show(ui, |plot_ui| {
            for marker in &map.markers {
                let color = frequency_color(marker.frequency);
                plot_ui.polygon(
                    Polygon::new(circle(marker))
                        .name(format!("{} ({})", marker.area_name, marker.count))
                        .fill_color(color.gamma_multiply(0.6))
                        .stroke(Stroke::new(1.5, color)),
                );
            }
        });

    legend(ui);
}

/// Circle of `marker.radius_m` metres around the marker center, in degrees.
fn circle(marker: &AreaMarker) -> PlotPoints {
    let lat_r = marker.radius_m / METRES_PER_DEGREE;
    let cos_lat = marker.center.latitude.to_radians().cos().abs().max(1e-6);
    let lon_r = lat_r / cos_lat;
    (0..CIRCLE_SEGMENTS)
        .map(|k| {
            let a = TAU * k as f64 / CIRCLE_SEGMENTS as f64;
            [
                marker.center.longitude + lon_r * a.cos(),
                marker.center.latitude + lat_r * a.sin(),
            ]
        })
        .collect()
}

fn legend(ui: &mut Ui) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.strong("Crime Frequency Legend");
        for (label, color) in frequency_legend() {
            ui.horizontal(|ui| {
                ui.label(RichText::new("⬤").color(color));
                ui.label(label);
            });
        }
    });
}
