use std::sync::Arc;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::data::aggregate::{self, CategoryCount, TrendPoint};
use crate::data::clean::CleanReport;
use crate::data::filter::{filtered_indices, FilterParams};
use crate::data::geo::{self, FrequencyMap, GeoPoints};
use crate::data::model::{AgeGroup, Incident, IncidentTable};
use crate::data::stats::{self, CorrelationMatrix};
use crate::data::Dataset;

// ---------------------------------------------------------------------------
// DashboardResult – everything the renderers need for one filter selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardResult {
    pub filtered_count: usize,
    pub trend: Vec<TrendPoint>,
    pub by_area: Vec<CategoryCount<String>>,
    pub by_age_group: Vec<CategoryCount<AgeGroup>>,
    pub by_weapon: Vec<CategoryCount<String>>,
    /// `None` when there are not enough complete numeric rows.
    pub correlation: Option<CorrelationMatrix>,
    pub points: GeoPoints,
    /// `None` when no filtered incident has coordinates.
    pub frequency_map: Option<FrequencyMap>,
}

/// Filter the table and run every aggregator on the result.
pub fn recompute(
    table: &IncidentTable,
    params: &FilterParams,
    config: &DashboardConfig,
) -> DashboardResult {
    let view: Vec<&Incident> = filtered_indices(table, params)
        .into_iter()
        .map(|i| &table.incidents[i])
        .collect();

    let frequency_map = if table.has_coordinates {
        geo::frequency_map(
            &view,
            config.high_quantile,
            config.medium_quantile,
            config.marker_radius_m,
        )
    } else {
        None
    };

    DashboardResult {
        filtered_count: view.len(),
        trend: aggregate::monthly_trend(&view),
        by_area: aggregate::counts_by_area(&view),
        by_age_group: aggregate::counts_by_age_group(&view),
        by_weapon: aggregate::top_weapon_counts(&view),
        correlation: stats::correlation_matrix(&table.numeric_columns, &view),
        points: geo::geo_points(&view, table.has_coordinates),
        frequency_map,
    }
}

// ---------------------------------------------------------------------------
// Session – one user's table and filter state
// ---------------------------------------------------------------------------

/// One dashboard session: a shared, immutable table plus this user's
/// selections and the result computed for them.
pub struct Session {
    pub table: Arc<IncidentTable>,
    pub report: CleanReport,
    pub config: DashboardConfig,
    /// Selections as edited by the controls.
    pub params: FilterParams,
    result: DashboardResult,
    /// Parameters `result` was computed for.
    computed_for: FilterParams,
}

impl Session {
    /// Start a session with everything selected.
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let table = Arc::new(dataset.table);
        let params = FilterParams::select_all(&table);
        let result = recompute(&table, &params, &config);
        Self {
            table,
            report: dataset.report,
            config,
            computed_for: params.clone(),
            params,
            result,
        }
    }

    /// Recompute if the selections changed since the last call.
    /// Returns whether a recomputation happened.
    pub fn refresh(&mut self) -> bool {
        if self.params == self.computed_for {
            return false;
        }
        self.result = recompute(&self.table, &self.params, &self.config);
        self.computed_for = self.params.clone();
        log::debug!("Recomputed dashboard: {} incidents", self.result.filtered_count);
        true
    }

    pub fn result(&self) -> &DashboardResult {
        &self.result
    }

    /// Replace the selections and recompute.
    pub fn set_params(&mut self, params: FilterParams) -> &DashboardResult {
        self.params = params;
        self.refresh();
        &self.result
    }

    pub fn select_all(&mut self) {
        self.params = FilterParams::select_all(&self.table);
        self.refresh();
    }
}
