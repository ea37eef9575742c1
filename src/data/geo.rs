use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::model::Incident;
use super::stats::quantile;

/// How busy an area is relative to the other areas in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrimeFrequency {
    Low,
    Medium,
    High,
}

impl CrimeFrequency {
    pub const ALL: [CrimeFrequency; 3] = [
        CrimeFrequency::High,
        CrimeFrequency::Medium,
        CrimeFrequency::Low,
    ];

    /// Marker color name used by the map legend.
    pub fn color_name(self) -> &'static str {
        match self {
            CrimeFrequency::High => "red",
            CrimeFrequency::Medium => "orange",
            CrimeFrequency::Low => "green",
        }
    }

    pub fn classify(count: f64, thresholds: &FrequencyThresholds) -> Self {
        if count >= thresholds.high {
            CrimeFrequency::High
        } else if count >= thresholds.medium {
            CrimeFrequency::Medium
        } else {
            CrimeFrequency::Low
        }
    }
}

impl fmt::Display for CrimeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrimeFrequency::High => "high",
            CrimeFrequency::Medium => "medium",
            CrimeFrequency::Low => "low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Point-map input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum GeoPoints {
    Available(Vec<GeoPoint>),
    /// The source had no `latitude`/`longitude` columns.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyThresholds {
    pub high: f64,
    pub medium: f64,
}

/// One circle on the frequency map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaMarker {
    pub area_name: String,
    pub count: usize,
    pub frequency: CrimeFrequency,
    pub center: GeoPoint,
    pub radius_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyMap {
    pub center: GeoPoint,
    pub thresholds: FrequencyThresholds,
    pub markers: Vec<AreaMarker>,
}

/// Coordinates of every incident in the view that has both.
pub fn geo_points(view: &[&Incident], has_coordinates: bool) -> GeoPoints {
    if !has_coordinates {
        return GeoPoints::Unavailable;
    }
    GeoPoints::Available(
        view.iter()
            .filter_map(|inc| inc.coordinates())
            .map(|(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            })
            .collect(),
    )
}

/// Per-area frequency thresholds from the view's area counts.
pub fn frequency_thresholds(
    area_counts: &[usize],
    high_q: f64,
    medium_q: f64,
) -> Option<FrequencyThresholds> {
    let counts: Vec<f64> = area_counts.iter().map(|&c| c as f64).collect();
    Some(FrequencyThresholds {
        high: quantile(&counts, high_q)?,
        medium: quantile(&counts, medium_q)?,
    })
}

#[derive(Default)]
struct AreaAccumulator {
    count: usize,
    lat_sum: f64,
    lon_sum: f64,
    located: usize,
}

/// Classify every area of the view and place one marker at the mean
/// coordinates of its incidents.
///
/// `None` when the view has no located incidents, since the map center is
/// undefined. Areas whose incidents all lack coordinates get no marker but
/// still take part in the thresholds.
pub fn frequency_map(
    view: &[&Incident],
    high_q: f64,
    medium_q: f64,
    radius_m: f64,
) -> Option<FrequencyMap> {
    let mut areas: BTreeMap<&str, AreaAccumulator> = BTreeMap::new();
    let (mut lat_sum, mut lon_sum, mut located) = (0.0, 0.0, 0usize);

    for inc in view {
        let coords = inc.coordinates();
        if let Some((lat, lon)) = coords {
            lat_sum += lat;
            lon_sum += lon;
            located += 1;
        }
        let Some(area) = inc.area_name.as_deref() else {
            continue;
        };
        let acc = areas.entry(area).or_default();
        acc.count += 1;
        if let Some((lat, lon)) = coords {
            acc.lat_sum += lat;
            acc.lon_sum += lon;
            acc.located += 1;
        }
    }

    if located == 0 {
        return None;
    }

    let counts: Vec<usize> = areas.values().map(|a| a.count).collect();
    let thresholds = frequency_thresholds(&counts, high_q, medium_q)?;

    let markers = areas
        .into_iter()
        .filter(|(_, acc)| acc.located > 0)
        .map(|(name, acc)| AreaMarker {
            area_name: name.to_string(),
            count: acc.count,
            frequency: CrimeFrequency::classify(acc.count as f64, &thresholds),
            center: GeoPoint {
                latitude: acc.lat_sum / acc.located as f64,
                longitude: acc.lon_sum / acc.located as f64,
            },
            radius_m,
        })
        .collect();

    Some(FrequencyMap {
        center: GeoPoint {
            latitude: lat_sum / located as f64,
            longitude: lon_sum / located as f64,
        },
        thresholds,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn incident(area: &str, coords: Option<(f64, f64)>) -> Incident {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Incident {
            date_occurred: date,
            date_reported: date,
            month: 1,
            year: 2020,
            area_name: Some(area.to_string()),
            victim_age: None,
            age_group: None,
            victim_sex: "F".to_string(),
            weapon_description: "W".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            numeric: Vec::new(),
        }
    }

    fn rows(counts: &[(&str, usize)]) -> Vec<Incident> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(i, &(area, n))| {
                (0..n).map(move |k| incident(area, Some((34.0 + i as f64, -118.0 + k as f64))))
            })
            .collect()
    }

    #[test]
    fn areas_are_classified_by_quantiles() {
        let rows = rows(&[("A", 1), ("B", 5), ("C", 10)]);
        let view: Vec<&Incident> = rows.iter().collect();
        let map = frequency_map(&view, 0.67, 0.33, 700.0).unwrap();

        let by_name: BTreeMap<&str, CrimeFrequency> = map
            .markers
            .iter()
            .map(|m| (m.area_name.as_str(), m.frequency))
            .collect();
        assert_eq!(by_name["A"], CrimeFrequency::Low);
        assert_eq!(by_name["B"], CrimeFrequency::Medium);
        assert_eq!(by_name["C"], CrimeFrequency::High);

        let c = map.markers.iter().find(|m| m.area_name == "C").unwrap();
        assert_eq!(c.center.latitude, 36.0);
        assert_eq!(c.center.longitude, -118.0 + 4.5);
        assert_eq!(c.radius_m, 700.0);
    }

    #[test]
    fn classification_is_monotonic_in_count() {
        let rows = rows(&[("A", 3), ("B", 7), ("C", 2), ("D", 7), ("E", 11), ("F", 1)]);
        let view: Vec<&Incident> = rows.iter().collect();
        let map = frequency_map(&view, 0.67, 0.33, 700.0).unwrap();
        for a in &map.markers {
            for b in &map.markers {
                if a.count > b.count {
                    assert!(a.frequency >= b.frequency, "{} vs {}", a.area_name, b.area_name);
                }
            }
        }
    }

    #[test]
    fn single_area_is_high() {
        let rows = rows(&[("A", 4)]);
        let view: Vec<&Incident> = rows.iter().collect();
        let map = frequency_map(&view, 0.67, 0.33, 700.0).unwrap();
        assert_eq!(map.markers[0].frequency, CrimeFrequency::High);
    }

    #[test]
    fn empty_or_unlocated_view_has_no_map() {
        assert!(frequency_map(&[], 0.67, 0.33, 700.0).is_none());
        let rows = [incident("A", None)];
        let view: Vec<&Incident> = rows.iter().collect();
        assert!(frequency_map(&view, 0.67, 0.33, 700.0).is_none());
    }

    #[test]
    fn points_need_coordinate_columns() {
        let rows = [incident("A", Some((1.0, 2.0))), incident("B", None)];
        let view: Vec<&Incident> = rows.iter().collect();
        assert_eq!(geo_points(&view, false), GeoPoints::Unavailable);
        assert_eq!(
            geo_points(&view, true),
            GeoPoints::Available(vec![GeoPoint {
                latitude: 1.0,
                longitude: 2.0
            }])
        );
    }
}
