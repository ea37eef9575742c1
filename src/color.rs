use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::geo::CrimeFrequency;

// ---------------------------------------------------------------------------
// Color ramps
// ---------------------------------------------------------------------------

/// Anchor colors of the viridis ramp, low to high.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Anchor colors of the coolwarm diverging ramp, -1 to +1.
const COOLWARM: [(u8, u8, u8); 3] = [(59, 76, 192), (221, 221, 221), (180, 4, 38)];

fn to_linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn to_color32(c: LinSrgb) -> Color32 {
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(c).into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Sample a piecewise-linear ramp at `t` in `[0, 1]`, mixing in linear RGB.
fn sample_ramp(anchors: &[(u8, u8, u8)], t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (anchors.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(anchors.len() - 2);
    let local = pos - i as f32;
    to_color32(to_linear(anchors[i]).mix(to_linear(anchors[i + 1]), local))
}

/// Viridis color for `value` normalised into `[min, max]`.
pub fn viridis(value: f64, min: f64, max: f64) -> Color32 {
    let range = max - min;
    let t = if range.abs() < f64::EPSILON {
        0.5
    } else {
        (value - min) / range
    };
    sample_ramp(&VIRIDIS, t as f32)
}

/// Coolwarm color for a correlation coefficient; grey for `NaN`.
pub fn coolwarm(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::GRAY;
    }
    sample_ramp(&COOLWARM, ((r + 1.0) / 2.0) as f32)
}

// ---------------------------------------------------------------------------
// Fixed colors
// ---------------------------------------------------------------------------

pub fn frequency_color(frequency: CrimeFrequency) -> Color32 {
    match frequency {
        CrimeFrequency::High => Color32::from_rgb(220, 30, 30),
        CrimeFrequency::Medium => Color32::from_rgb(255, 140, 0),
        CrimeFrequency::Low => Color32::from_rgb(30, 160, 60),
    }
}

/// Legend entries for the frequency map (label → color).
pub fn frequency_legend() -> Vec<(String, Color32)> {
    CrimeFrequency::ALL
        .iter()
        .map(|&f| (format!("{f} crimes ({})", f.color_name()), frequency_color(f)))
        .collect()
}

pub const AGE_BAR_COLOR: Color32 = Color32::from_rgb(135, 206, 235);
pub const WEAPON_BAR_COLOR: Color32 = Color32::from_rgb(220, 20, 60);
pub const TREND_LINE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);
