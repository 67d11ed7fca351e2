//! Collapse per-asset price paths into portfolio dollar paths
//!
//! Each asset starts with `initial_value · weight_i` dollars and is held
//! without rebalancing, so the portfolio value at a step is the weighted sum
//! of normalized prices.

use crate::error::{Result, SimulationError};
use crate::model::{PortfolioPaths, SimulatedPaths};

/// Dollar value per `[scenario, step]`.
///
/// `weights` are in column order and already validated against the asset list.
pub fn aggregate_portfolio(
    paths: &SimulatedPaths,
    weights: &[f64],
    initial_value: f64,
) -> Result<PortfolioPaths> {
    if weights.len() != paths.num_assets() {
        return Err(SimulationError::Config(format!(
            "{} weights supplied for paths of {} assets",
            weights.len(),
            paths.num_assets()
        )));
    }

    let allocations = dollar_allocations(weights, initial_value);
    let data = paths
        .data()
        .chunks(paths.num_assets())
        .map(|prices| prices.iter().zip(&allocations).map(|(p, a)| p * a).sum())
        .collect();

    let (num_scenarios, num_steps) = (paths.num_scenarios(), paths.num_steps());
    let portfolio = PortfolioPaths::new(num_scenarios, num_steps, initial_value, data);
    Ok(portfolio)
}

/// Starting dollars per asset
#[must_use]
pub fn dollar_allocations(weights: &[f64], initial_value: f64) -> Vec<f64> {
    weights.iter().map(|w| w * initial_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sum_of_prices() {
        // 1 scenario, 2 steps, 2 assets
        let mut paths = SimulatedPaths::filled(1, 2, 2, 1.0);
        paths.data_mut()[2] = 1.10;
        paths.data_mut()[3] = 0.90;

        let portfolio = aggregate_portfolio(&paths, &[0.75, 0.25], 1_000.0).unwrap();

        assert_eq!(portfolio.scenario(0)[0], 1_000.0);
        assert!((portfolio.scenario(0)[1] - (825.0 + 225.0)).abs() < 1e-9);
        assert!((portfolio.final_returns()[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_weight_count_mismatch() {
        let paths = SimulatedPaths::filled(1, 2, 2, 1.0);
        assert!(matches!(
            aggregate_portfolio(&paths, &[1.0], 1_000.0),
            Err(SimulationError::Config(_))
        ));
    }
}
