//! Path-level analytics: percentile bands over time and drawdowns

use super::{percentile, sorted};
use crate::model::{DrawdownStats, PercentileBands, PortfolioPaths};

/// Percentiles of portfolio value across scenarios at every step.
#[must_use]
pub fn percentile_bands(portfolio: &PortfolioPaths, percentiles: &[f64]) -> PercentileBands {
    let mut values = vec![Vec::with_capacity(portfolio.num_steps()); percentiles.len()];
    let mut column = Vec::with_capacity(portfolio.num_scenarios());

    for step in 0..portfolio.num_steps() {
        column.clear();
        column.extend(portfolio.scenarios().map(|path| path[step]));
        column.sort_by(f64::total_cmp);
        for (band, &p) in values.iter_mut().zip(percentiles) {
            band.push(percentile(&column, p));
        }
    }

    PercentileBands {
        percentiles: percentiles.to_vec(),
        values,
    }
}

/// Maximum peak-to-trough decline of a value path, as a positive fraction
/// (0.25 = 25% drawdown)
#[must_use]
pub fn max_drawdown(path: &[f64]) -> f64 {
    let Some(&first) = path.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_drawdown = 0.0;

    for &value in path {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let drawdown = (peak - value) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}

/// Mean, median and 95th percentile of per-scenario maximum drawdowns
#[must_use]
pub fn summarize_drawdowns(portfolio: &PortfolioPaths) -> DrawdownStats {
    let drawdowns: Vec<f64> = portfolio.scenarios().map(max_drawdown).collect();
    if drawdowns.is_empty() {
        return DrawdownStats::default();
    }
    let drawdowns_sorted = sorted(&drawdowns);

    DrawdownStats {
        mean: drawdowns.iter().sum::<f64>() / drawdowns.len() as f64,
        median: percentile(&drawdowns_sorted, 0.50),
        p95: percentile(&drawdowns_sorted, 0.95),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_drawdown() {
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        // Peak 200, trough 150
        let dd = max_drawdown(&[100.0, 200.0, 150.0, 180.0, 160.0]);
        assert!((dd - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_bands_follow_scenarios() {
        // Three scenarios, three steps
        let portfolio = PortfolioPaths::new(
            3,
            3,
            100.0,
            vec![
                100.0, 90.0, 80.0, //
                100.0, 100.0, 100.0, //
                100.0, 110.0, 130.0,
            ],
        );
        let bands = percentile_bands(&portfolio, &[0.0, 0.5, 1.0]);

        assert_eq!(bands.band(0.0).unwrap(), &[100.0, 90.0, 80.0]);
        assert_eq!(bands.band(0.5).unwrap(), &[100.0, 100.0, 100.0]);
        assert_eq!(bands.band(1.0).unwrap(), &[100.0, 110.0, 130.0]);
        assert!(bands.band(0.25).is_none());

        let dd = summarize_drawdowns(&portfolio);
        // Drawdowns: 0.2, 0, 0
        assert!((dd.mean - 0.2 / 3.0).abs() < 1e-12);
        assert_eq!(dd.median, 0.0);
    }
}
