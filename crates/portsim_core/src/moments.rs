//! Mean vector and covariance matrix of daily returns

use serde::{Deserialize, Serialize};

use crate::config::TRADING_DAYS_PER_YEAR;
use crate::error::{Result, SimulationError};
use crate::model::HistoricalReturns;

/// Minimum observations for a sample covariance
pub const MIN_OBSERVATIONS: usize = 2;

/// First and second moments of a returns table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentEstimate {
    pub means: Vec<f64>,
    /// Symmetric N×N sample covariance
    pub covariance: Vec<Vec<f64>>,
    /// Whether both moments have been scaled by 252
    pub annualized: bool,
}

impl MomentEstimate {
    /// Build from known daily moments (e.g. model parameters rather than data).
    pub fn from_daily(means: Vec<f64>, covariance: Vec<Vec<f64>>) -> Result<Self> {
        let n = means.len();
        if n == 0 || covariance.len() != n || covariance.iter().any(|row| row.len() != n) {
            return Err(SimulationError::Config(format!(
                "covariance must be {n}x{n} to match the mean vector"
            )));
        }
        Ok(Self {
            means,
            covariance,
            annualized: false,
        })
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.means.len()
    }

    /// Diagonal of the covariance matrix
    #[must_use]
    pub fn variances(&self) -> Vec<f64> {
        (0..self.num_assets())
            .map(|i| self.covariance[i][i])
            .collect()
    }

    /// Pairwise correlation; 0 when either variance is 0
    #[must_use]
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        let denom = (self.covariance[i][i] * self.covariance[j][j]).sqrt();
        if denom > 0.0 {
            self.covariance[i][j] / denom
        } else {
            0.0
        }
    }

    /// Annual moments (means and covariance × 252). No-op if already annual.
    #[must_use]
    pub fn annualized(&self) -> Self {
        if self.annualized {
            return self.clone();
        }
        Self {
            means: self
                .means
                .iter()
                .map(|m| m * TRADING_DAYS_PER_YEAR)
                .collect(),
            covariance: self
                .covariance
                .iter()
                .map(|row| row.iter().map(|c| c * TRADING_DAYS_PER_YEAR).collect())
                .collect(),
            annualized: true,
        }
    }
}

/// Estimate the mean vector and sample covariance (divisor `n - 1`) of `returns`.
pub fn estimate_moments(returns: &HistoricalReturns, annualize: bool) -> Result<MomentEstimate> {
    let n = returns.len();
    if n < MIN_OBSERVATIONS {
        return Err(SimulationError::InsufficientData {
            required: MIN_OBSERVATIONS,
            available: n,
        });
    }

    let means: Vec<f64> = returns.columns().iter().map(|c| mean(c)).collect();
    let k = returns.num_assets();
    let mut covariance = vec![vec![0.0; k]; k];

    for i in 0..k {
        for j in 0..=i {
            let (xi, xj) = (returns.column(i), returns.column(j));
            let c = xi
                .iter()
                .zip(xj)
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum::<f64>()
                / (n - 1) as f64;
            covariance[i][j] = c;
            covariance[j][i] = c;
        }
    }

    let estimate = MomentEstimate {
        means,
        covariance,
        annualized: false,
    };
    Ok(if annualize {
        estimate.annualized()
    } else {
        estimate
    })
}

/// Arithmetic mean; 0 for an empty slice
#[must_use]
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

/// Sample standard deviation (divisor `n - 1`); 0 below two observations
#[must_use]
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;
    use jiff::civil::date;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> HistoricalReturns {
        let n = columns[0].1.len();
        let dates = date(2024, 1, 2).series(1.day()).take(n).collect();
        HistoricalReturns::new(dates, columns).unwrap()
    }

    #[test]
    fn test_daily_moments() {
        let returns = table(vec![
            ("A", vec![0.01, 0.03, -0.01, 0.01]),
            ("B", vec![0.02, 0.06, -0.02, 0.02]),
        ]);
        let est = estimate_moments(&returns, false).unwrap();

        assert!((est.means[0] - 0.01).abs() < 1e-12);
        assert!((est.means[1] - 0.02).abs() < 1e-12);
        // var(A) = (0 + 0.0004 + 0.0004 + 0) / 3
        assert!((est.covariance[0][0] - 0.0008 / 3.0).abs() < 1e-15);
        // B = 2A, so cov(A, B) = 2 var(A) and the pair is perfectly correlated
        let (var_a, cov_ab) = (est.covariance[0][0], est.covariance[0][1]);
        assert!((cov_ab - 2.0 * var_a).abs() < 1e-15);
        assert_eq!(cov_ab, est.covariance[1][0]);
        assert!((est.correlation(0, 1) - 1.0).abs() < 1e-12);
        assert!(!est.annualized);
    }

    #[test]
    fn test_annualization_scales_both_moments() {
        let returns = table(vec![("A", vec![0.001, 0.003, -0.001])]);
        let daily = estimate_moments(&returns, false).unwrap();
        let annual = estimate_moments(&returns, true).unwrap();

        assert!(annual.annualized);
        assert!((annual.means[0] - daily.means[0] * 252.0).abs() < 1e-12);
        let daily_var = daily.covariance[0][0];
        assert!((annual.covariance[0][0] - daily_var * 252.0).abs() < 1e-12);
        // Annualizing twice is a no-op
        assert_eq!(annual.annualized(), annual);
    }

    #[test]
    fn test_insufficient_data() {
        let returns = table(vec![("A", vec![0.01])]);
        assert_eq!(
            estimate_moments(&returns, true).unwrap_err(),
            SimulationError::InsufficientData {
                required: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_helpers_handle_short_input() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_std(&[0.5]), 0.0);
        assert!((sample_std(&[1.0, 3.0]) - 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
