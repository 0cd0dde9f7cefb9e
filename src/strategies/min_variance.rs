//! Minimum-variance weighting via a quadratic program.

use super::common::{bootstrap_or_index, lookback_covariance, round_weights, BootstrapOrIndex};
use super::WeightStrategy;
use crate::config::OptimizerOptions;
use crate::error::{BacktestError, Result};
use crate::types::AssetInfo;
use tracing::debug;

/// Solves `min ½ w'Σw` subject to the weights summing to 1 and staying
/// inside the per-asset box bounds. The only strategy that uses an exact
/// constrained solver rather than iterative approximation.
pub struct MinimumVariance {
    options: OptimizerOptions,
}

impl MinimumVariance {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }
}

impl WeightStrategy for MinimumVariance {
    fn name(&self) -> &str {
        "Minimum Variance"
    }

    fn weights_for(&mut self, assets: &[AssetInfo], day: &str) -> Result<Vec<f64>> {
        let index = match bootstrap_or_index(assets, day)? {
            BootstrapOrIndex::Bootstrap(weights) => return Ok(weights),
            BootstrapOrIndex::Index(index) => index,
        };
        let cov = lookback_covariance(assets, index, self.options.back);
        let weights = solve_qp(&cov, self.options.min_weight, self.options.max_weight)?;
        debug!("minimum variance at {}: {:?}", day, weights);
        Ok(round_weights(&weights))
    }
}

/// Solve the box-constrained minimum-variance program with an interior-point
/// QP solver: one zero-cone row for the weight sum, 2N nonnegative-cone rows
/// for the bounds.
fn solve_qp(cov: &[Vec<f64>], min_weight: f64, max_weight: f64) -> Result<Vec<f64>> {
    use clarabel::algebra::*;
    use clarabel::solver::*;

    let n = cov.len();

    // P in CSC format, upper triangle only, column by column.
    let mut p_data = Vec::new();
    let mut p_indices = Vec::new();
    let mut p_indptr = vec![0];
    for j in 0..n {
        for (i, row) in cov.iter().enumerate().take(j + 1) {
            let val = row[j];
            if val.abs() > 1e-12 {
                p_data.push(val);
                p_indices.push(i);
            }
        }
        p_indptr.push(p_data.len());
    }
    let p = CscMatrix::new(n, n, p_indptr, p_indices, p_data);
    let q = vec![0.0; n];

    // Constraint rows: [sum(w) = 1; -w <= -min; w <= max].
    let mut a_data = Vec::new();
    let mut a_indices = Vec::new();
    let mut a_indptr = vec![0];
    for j in 0..n {
        a_data.push(1.0);
        a_indices.push(0);
        a_data.push(-1.0);
        a_indices.push(1 + j);
        a_data.push(1.0);
        a_indices.push(1 + n + j);
        a_indptr.push(a_data.len());
    }
    let a = CscMatrix::new(1 + 2 * n, n, a_indptr, a_indices, a_data);

    let mut b = vec![1.0];
    b.extend(std::iter::repeat(-min_weight).take(n));
    b.extend(std::iter::repeat(max_weight).take(n));

    let cones = [ZeroConeT(1), NonnegativeConeT(2 * n)];

    let settings = DefaultSettingsBuilder::default()
        .max_iter(200)
        .verbose(false)
        .build()
        .map_err(|e| BacktestError::OptimizationError(format!("failed to build settings: {e}")))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
        .map_err(|e| BacktestError::OptimizationError(format!("failed to create solver: {e:?}")))?;
    solver.solve();

    if !matches!(
        solver.solution.status,
        SolverStatus::Solved | SolverStatus::AlmostSolved
    ) {
        return Err(BacktestError::OptimizationError(format!(
            "minimum-variance optimization failed with status: {:?}",
            solver.solution.status
        )));
    }

    Ok(solver
        .solution
        .x
        .iter()
        .map(|&w| w.clamp(min_weight, max_weight))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnSeries;

    fn asset(symbol: &str, returns: Vec<f64>) -> AssetInfo {
        let days: Vec<String> = (0..returns.len())
            .map(|i| format!("2024-{:02}-{:02}", i / 28 + 1, i % 28 + 1))
            .collect();
        AssetInfo::new(
            symbol,
            symbol,
            ReturnSeries::new(days, returns).unwrap(),
        )
    }

    #[test]
    fn test_bootstrap_returns_equal_weights() {
        let assets = vec![
            asset("A", vec![0.01; 30]),
            asset("B", vec![0.02; 30]),
            asset("C", vec![0.03; 30]),
        ];
        let mut strategy = MinimumVariance::new(OptimizerOptions::default());
        let day = assets[0].days[10].clone();
        let weights = strategy.weights_for(&assets, &day).unwrap();
        assert_eq!(weights, vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn test_identical_series_split_evenly() {
        let assets = vec![asset("A", vec![0.01; 30]), asset("B", vec![0.01; 30])];
        let options = OptimizerOptions {
            min_weight: 0.0,
            max_weight: 1.0,
            back: 10,
            ..OptimizerOptions::default()
        };
        let mut strategy = MinimumVariance::new(options);
        let day = assets[0].days[25].clone();
        let weights = strategy.weights_for(&assets, &day).unwrap();

        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((weights[0] - weights[1]).abs() < 0.2, "weights: {weights:?}");
    }

    #[test]
    fn test_prefers_the_quiet_asset() {
        // Perfectly correlated but twice the amplitude: everything goes to
        // the calmer asset.
        let mut noisy = Vec::new();
        let mut quiet = Vec::new();
        for i in 0..60 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            noisy.push(0.02 * sign);
            quiet.push(0.01 * sign);
        }
        let assets = vec![asset("NOISY", noisy), asset("QUIET", quiet)];
        let options = OptimizerOptions {
            min_weight: 0.0,
            max_weight: 1.0,
            back: 40,
            ..OptimizerOptions::default()
        };
        let mut strategy = MinimumVariance::new(options);
        let day = assets[0].days[55].clone();
        let weights = strategy.weights_for(&assets, &day).unwrap();
        assert!(weights[1] > 0.9, "weights: {weights:?}");
    }

    #[test]
    fn test_contradictory_bounds_are_an_optimization_error() {
        let assets = vec![asset("A", vec![0.01; 40]), asset("B", vec![-0.01; 40])];
        let options = OptimizerOptions {
            min_weight: 0.6,
            max_weight: 0.7,
            back: 10,
            ..OptimizerOptions::default()
        };
        let mut strategy = MinimumVariance::new(options);
        let day = assets[0].days[30].clone();
        let result = strategy.weights_for(&assets, &day);
        assert!(matches!(result, Err(BacktestError::OptimizationError(_))));
    }

    #[test]
    fn test_weights_are_whole_percents() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        for i in 0..80 {
            let phase = i as f64 * 0.7;
            a.push(phase.sin() * 0.015);
            b.push((phase + 1.3).cos() * 0.008);
        }
        let assets = vec![asset("A", a), asset("B", b)];
        let options = OptimizerOptions {
            min_weight: 0.0,
            max_weight: 1.0,
            back: 60,
            ..OptimizerOptions::default()
        };
        let mut strategy = MinimumVariance::new(options);
        let day = assets[0].days[70].clone();
        let weights = strategy.weights_for(&assets, &day).unwrap();

        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for w in &weights {
            let cents = w * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6, "weights: {weights:?}");
        }
    }
}
