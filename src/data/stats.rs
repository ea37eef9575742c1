use serde::Serialize;

use super::model::Incident;

/// Pairwise Pearson correlations over the numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`.
    /// `NaN` where a column has no variance.
    pub values: Vec<Vec<f64>>,
    /// Complete rows the matrix was computed from.
    pub sample_size: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Quantile with linear interpolation between the closest order statistics.
/// `None` for an empty sample.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Correlate every pair of numeric columns after dropping incidents with
/// any missing numeric value. `None` when fewer than two complete rows remain.
pub fn correlation_matrix(columns: &[String], view: &[&Incident]) -> Option<CorrelationMatrix> {
    let rows: Vec<Vec<f64>> = view
        .iter()
        .filter_map(|inc| inc.numeric.iter().copied().collect::<Option<Vec<f64>>>())
        .filter(|row| row.len() == columns.len())
        .collect();

    if rows.len() < 2 || columns.is_empty() {
        return None;
    }

    let n = columns.len();
    let series: Vec<Vec<f64>> = (0..n)
        .map(|c| rows.iter().map(|row| row[c]).collect())
        .collect();

    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
        sample_size: rows.len(),
    })
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
