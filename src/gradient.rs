//! Numerical gradient descent over a covariance matrix.
//!
//! The optimizer minimizes an arbitrary objective of (weights, covariance)
//! with central-finite-difference gradients, clamping each step into the
//! weight bounds and renormalizing to a unit sum. The learning rate carries
//! a random perturbation to escape flat or symmetric regions of the
//! objective; the generator is injected so runs are reproducible.

use rand::Rng;

/// Tunables for the gradient-descent loop.
#[derive(Debug, Clone, Copy)]
pub struct GdOptions {
    /// Iterations to run even after the weight change drops below tolerance.
    pub min_iterate: usize,
    /// Hard cap on iterations.
    pub max_iterate: usize,
    /// Base learning rate, perturbed by `U(0, 1)` each step.
    pub learning_rate: f64,
    /// L1 weight-change norm below which the loop may stop.
    pub tolerance: f64,
    /// Finite-difference step per weight coordinate.
    pub delta: f64,
    /// Lower weight bound applied before renormalization.
    pub min_weight: f64,
    /// Upper weight bound applied before renormalization.
    pub max_weight: f64,
}

impl Default for GdOptions {
    fn default() -> Self {
        Self {
            min_iterate: 5000,
            max_iterate: 50_000,
            learning_rate: 0.002,
            tolerance: 1e-4,
            delta: 5e-5,
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }
}

/// Minimize `objective` over weight vectors summing to 1.
///
/// Starts from equal weights. Stops once the L1 weight change stays below
/// `tolerance` past the iteration floor, or at `max_iterate`. When weights
/// stop moving before the floor, a 5x learning-rate kick pushes the search
/// out of premature convergence.
pub fn gradient_descent<F, R>(
    cov: &[Vec<f64>],
    objective: F,
    options: &GdOptions,
    rng: &mut R,
) -> Vec<f64>
where
    F: Fn(&[f64], &[Vec<f64>]) -> f64,
    R: Rng,
{
    let n = cov.len();
    let mut weights = vec![1.0 / n as f64; n];
    let mut diff = options.tolerance + 1.0;
    let mut iter = 0;

    while (diff > options.tolerance || iter < options.min_iterate) && iter < options.max_iterate {
        let gradient: Vec<f64> = (0..n)
            .map(|i| {
                let mut plus = weights.clone();
                plus[i] += options.delta;
                let mut minus = weights.clone();
                minus[i] -= options.delta;
                (objective(&plus, cov) - objective(&minus, cov)) / (2.0 * options.delta)
            })
            .collect();

        let last = weights.clone();
        let dynamic = if iter < options.min_iterate && diff < options.tolerance {
            5.0
        } else {
            1.0
        };
        for (w, g) in weights.iter_mut().zip(&gradient) {
            let lr = options.learning_rate * (1.0 + rng.gen::<f64>()) * dynamic;
            *w = (*w - lr * g).clamp(options.min_weight, options.max_weight);
        }
        let sum: f64 = weights.iter().sum();
        for w in weights.iter_mut() {
            *w /= sum;
        }

        diff = weights.iter().zip(&last).map(|(w, l)| (w - l).abs()).sum();
        iter += 1;
    }

    weights
}
