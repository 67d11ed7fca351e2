//! Cholesky factorization of the covariance matrix
//!
//! The simulator turns independent normal shocks into correlated ones with
//! a lower-triangular `L` where `L·Lᵀ = Σ`. Collinear assets or short
//! histories make `Σ` rank deficient, so a failed factorization is retried
//! exactly once with a small ridge `ε·I` added to the diagonal. A second
//! failure is fatal.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::AssetId;

/// Pivots not larger than this fraction of their diagonal entry count as zero
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-12;

/// Ridge size relative to the mean diagonal entry
const REGULARIZATION_SCALE: f64 = 1e-6;

/// Floor for the ridge when the diagonal is (nearly) zero
const MIN_REGULARIZATION: f64 = 1e-12;

/// Lower-triangular factor of a covariance matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFactor {
    /// Row-major lower triangle; entries above the diagonal are 0
    lower: Vec<Vec<f64>>,
    /// Ridge added to the diagonal before factorizing (0 if none was needed)
    regularization: f64,
}

impl CorrelationFactor {
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    #[must_use]
    pub fn lower(&self) -> &[Vec<f64>] {
        &self.lower
    }

    #[must_use]
    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    #[must_use]
    pub fn was_regularized(&self) -> bool {
        self.regularization > 0.0
    }

    /// Diagonal of `L · Lᵀ` (includes any ridge)
    #[must_use]
    pub fn variances(&self) -> Vec<f64> {
        self.lower
            .iter()
            .map(|row| row.iter().map(|l| l * l).sum())
            .collect()
    }

    /// `out = L · z`
    #[inline]
    pub fn correlate(&self, z: &[f64], out: &mut [f64]) {
        for (i, row) in self.lower.iter().enumerate() {
            out[i] = row[..=i].iter().zip(z).map(|(l, z)| l * z).sum();
        }
    }

    /// `L · Lᵀ`, the covariance this factor reproduces
    #[must_use]
    pub fn reconstruct(&self) -> Vec<Vec<f64>> {
        let n = self.dim();
        let mut out = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let k_max = i.min(j);
                out[i][j] = (0..=k_max)
                    .map(|k| self.lower[i][k] * self.lower[j][k])
                    .sum();
            }
        }
        out
    }
}

/// Factorize `covariance`, regularizing once on failure.
///
/// `assets` names the columns so a fatal failure can say which asset's
/// pivot collapsed.
pub fn factorize(covariance: &[Vec<f64>], assets: &[AssetId]) -> Result<CorrelationFactor> {
    let n = covariance.len();
    if n == 0 || covariance.iter().any(|row| row.len() != n) {
        return Err(SimulationError::Config(
            "covariance matrix must be square and non-empty".to_string(),
        ));
    }
    if covariance.iter().flatten().any(|c| !c.is_finite()) {
        return Err(SimulationError::Config(
            "covariance matrix contains non-finite values".to_string(),
        ));
    }

    let first_failure = match cholesky(covariance) {
        Ok(lower) => {
            return Ok(CorrelationFactor {
                lower,
                regularization: 0.0,
            });
        }
        Err(pivot) => pivot,
    };

    let mean_diagonal = (0..n).map(|i| covariance[i][i].abs()).sum::<f64>() / n as f64;
    let epsilon = (REGULARIZATION_SCALE * mean_diagonal).max(MIN_REGULARIZATION);
    tracing::warn!(
        asset = %asset_label(assets, first_failure),
        epsilon = epsilon,
        "Covariance not positive-definite, retrying with diagonal regularization"
    );

    let mut ridged = covariance.to_vec();
    for (i, row) in ridged.iter_mut().enumerate() {
        row[i] += epsilon;
    }

    match cholesky(&ridged) {
        Ok(lower) => Ok(CorrelationFactor {
            lower,
            regularization: epsilon,
        }),
        Err(pivot) => Err(SimulationError::SingularCovariance {
            assets: assets.get(pivot).cloned().into_iter().collect(),
        }),
    }
}

fn asset_label(assets: &[AssetId], index: usize) -> String {
    assets
        .get(index)
        .map_or_else(|| format!("#{index}"), ToString::to_string)
}

/// Plain Cholesky–Banachiewicz. Returns the index of the first failing pivot.
fn cholesky(matrix: &[Vec<f64>]) -> std::result::Result<Vec<Vec<f64>>, usize> {
    let n = matrix.len();
    let mut l = vec![vec![0.0_f64; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for (&lik, &ljk) in l[i].iter().zip(l[j].iter()).take(j) {
                sum -= lik * ljk;
            }

            if i == j {
                let tolerance = RELATIVE_PIVOT_TOLERANCE * matrix[i][i].abs();
                if !sum.is_finite() || sum <= tolerance {
                    return Err(i);
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Ok(l)
}
