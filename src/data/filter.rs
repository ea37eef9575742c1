use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{AgeGroup, Incident, IncidentTable};

// ---------------------------------------------------------------------------
// Filter parameters: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The four user selections. Within a dimension membership is OR, across
/// dimensions AND. An empty set in any dimension selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterParams {
    pub months: BTreeSet<u32>,
    pub areas: BTreeSet<String>,
    pub age_groups: BTreeSet<AgeGroup>,
    pub weapons: BTreeSet<String>,
    /// Let incidents without an age group through the age dimension.
    pub include_unknown_age: bool,
}

impl FilterParams {
    /// Everything selected: all months, areas, age groups and top weapons.
    pub fn select_all(table: &IncidentTable) -> Self {
        Self {
            months: (1..=12).collect(),
            areas: table.areas.iter().cloned().collect(),
            age_groups: AgeGroup::ALL.into_iter().collect(),
            weapons: table.top_weapons.iter().cloned().collect(),
            include_unknown_age: true,
        }
    }

    /// Whether any dimension has nothing selected.
    pub fn selects_nothing(&self) -> bool {
        self.months.is_empty()
            || self.areas.is_empty()
            || self.age_groups.is_empty()
            || self.weapons.is_empty()
    }

    /// Whether a single incident passes every dimension.
    pub fn matches(&self, incident: &Incident) -> bool {
        if self.selects_nothing() {
            return false;
        }
        let age_ok = match incident.age_group {
            Some(group) => self.age_groups.contains(&group),
            None => self.include_unknown_age,
        };
        age_ok
            && self.months.contains(&incident.month)
            && incident
                .area_name
                .as_ref()
                .is_some_and(|a| self.areas.contains(a))
            && self.weapons.contains(&incident.weapon_description)
    }
}

/// Return indices of incidents that pass all dimensions.
pub fn filtered_indices(table: &IncidentTable, params: &FilterParams) -> Vec<usize> {
    if params.selects_nothing() {
        return Vec::new();
    }
    table
        .incidents
        .iter()
        .enumerate()
        .filter(|(_, inc)| params.matches(inc))
        .map(|(i, _)| i)
        .collect()
}

/// Filter an arbitrary set of incidents, e.g. an already filtered view.
pub fn filter_incidents<'a, I>(incidents: I, params: &FilterParams) -> Vec<&'a Incident>
where
    I: IntoIterator<Item = &'a Incident>,
{
    incidents
        .into_iter()
        .filter(|inc| params.matches(inc))
        .collect()
}
