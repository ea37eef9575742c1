//! Grouped counts over a filtered view. Every function takes the view as a
//! slice of incident references and returns an empty result for empty input.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{AgeGroup, Incident};

/// Number of weapons shown in the weapon chart.
pub const TOP_WEAPON_BARS: usize = 10;

/// Incidents in one month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// A category label with its incident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount<K> {
    pub key: K,
    pub count: usize,
}

/// Count incidents per `(year, month)`, sorted by year then month.
pub fn monthly_trend(view: &[&Incident]) -> Vec<TrendPoint> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for inc in view {
        *counts.entry((inc.year, inc.month)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((year, month), count)| TrendPoint { year, month, count })
        .collect()
}

/// Count incidents per area, most incidents first. Ties are ordered by name.
pub fn counts_by_area(view: &[&Incident]) -> Vec<CategoryCount<String>> {
    value_counts(view.iter().filter_map(|inc| inc.area_name.as_deref()))
}

/// Count incidents per age group in label order; incidents without a group
/// are left out and groups with no incidents are omitted.
pub fn counts_by_age_group(view: &[&Incident]) -> Vec<CategoryCount<AgeGroup>> {
    let mut counts: BTreeMap<AgeGroup, usize> = BTreeMap::new();
    for group in view.iter().filter_map(|inc| inc.age_group) {
        *counts.entry(group).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| CategoryCount { key, count })
        .collect()
}

/// The [`TOP_WEAPON_BARS`] most frequent weapons, most frequent first.
pub fn top_weapon_counts(view: &[&Incident]) -> Vec<CategoryCount<String>> {
    let mut counts = value_counts(view.iter().map(|inc| inc.weapon_description.as_str()));
    counts.truncate(TOP_WEAPON_BARS);
    counts
}

fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount<String>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<CategoryCount<String>> = counts
        .into_iter()
        .map(|(key, count)| CategoryCount {
            key: key.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn incident(year: i32, month: u32, area: &str, age: Option<i64>, weapon: &str) -> Incident {
        let date = NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Incident {
            date_occurred: date,
            date_reported: date,
            month,
            year,
            area_name: Some(area.to_string()),
            victim_age: age,
            age_group: age.and_then(AgeGroup::from_age),
            victim_sex: "M".to_string(),
            weapon_description: weapon.to_string(),
            latitude: None,
            longitude: None,
            numeric: Vec::new(),
        }
    }

    #[test]
    fn trend_is_ordered_by_year_then_month() {
        let rows = [
            incident(2021, 3, "A", None, "W"),
            incident(2020, 12, "A", None, "W"),
            incident(2021, 3, "A", None, "W"),
            incident(2021, 1, "A", None, "W"),
        ];
        let view: Vec<&Incident> = rows.iter().collect();
        let trend = monthly_trend(&view);
        let keys: Vec<(i32, u32, usize)> =
            trend.iter().map(|p| (p.year, p.month, p.count)).collect();
        assert_eq!(keys, vec![(2020, 12, 1), (2021, 1, 1), (2021, 3, 2)]);
    }

    #[test]
    fn area_counts_sum_to_view_len() {
        let rows = [
            incident(2021, 1, "Harbor", None, "W"),
            incident(2021, 1, "Central", None, "W"),
            incident(2021, 1, "Harbor", None, "W"),
        ];
        let view: Vec<&Incident> = rows.iter().collect();
        let counts = counts_by_area(&view);
        assert_eq!(counts[0].key, "Harbor");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), view.len());
    }

    #[test]
    fn age_groups_skip_unknown() {
        let rows = [
            incident(2021, 1, "A", Some(60), "W"),
            incident(2021, 1, "A", None, "W"),
            incident(2021, 1, "A", Some(5), "W"),
            incident(2021, 1, "A", Some(150), "W"),
        ];
        let view: Vec<&Incident> = rows.iter().collect();
        let counts = counts_by_age_group(&view);
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    key: AgeGroup::Minor,
                    count: 1,
                },
                CategoryCount {
                    key: AgeGroup::Senior,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn weapon_counts_are_truncated() {
        let rows: Vec<Incident> = (0..12)
            .flat_map(|w| {
                (0..=w).map(move |_| incident(2021, 1, "A", None, &format!("W{w:02}")))
            })
            .collect();
        let view: Vec<&Incident> = rows.iter().collect();
        let counts = top_weapon_counts(&view);
        assert_eq!(counts.len(), TOP_WEAPON_BARS);
        assert_eq!(counts[0].key, "W11");
        assert_eq!(counts[0].count, 12);
        assert_eq!(counts[9].key, "W02");
    }

    #[test]
    fn empty_view_gives_empty_results() {
        let view: Vec<&Incident> = Vec::new();
        assert!(monthly_trend(&view).is_empty());
        assert!(counts_by_area(&view).is_empty());
        assert!(counts_by_age_group(&view).is_empty());
        assert!(top_weapon_counts(&view).is_empty());
    }
}
