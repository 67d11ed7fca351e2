//! Side-by-side simulation of a current and a candidate allocation
//!
//! Both runs share one moment estimate, one correlation factor and one
//! expected-return vector, so any difference comes from the weights and the
//! independent random draws. The candidate uses the current run's seed plus
//! one, keeping the pair reproducible from a single seed.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::model::{HistoricalReturns, MonteCarloResult, WeightVector};
use crate::simulation::{PreparedInputs, resolve_seed, run_prepared};

/// Seed offset between the current and the candidate run
pub const CANDIDATE_SEED_OFFSET: u64 = 1;

/// Confidence level used for the VaR / CVaR deltas
pub const DELTA_CONFIDENCE: f64 = 0.95;

/// Improvement of the candidate over the current allocation.
///
/// Every field is oriented so that a positive value means the candidate is
/// better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaMetrics {
    pub expected_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub probability_of_profit: f64,
    /// Candidate VaR minus current VaR (both returns; less negative is better)
    pub value_at_risk_95: Option<f64>,
    /// `None` when either side's CVaR is undefined
    pub conditional_value_at_risk_95: Option<f64>,
    /// Current volatility minus candidate volatility
    pub volatility: f64,
}

impl DeltaMetrics {
    #[must_use]
    pub fn between(current: &MonteCarloResult, candidate: &MonteCarloResult) -> Self {
        let (cur, cand) = (&current.metrics, &candidate.metrics);
        let diff = |a: Option<f64>, b: Option<f64>| Some(b? - a?);

        Self {
            expected_return: cand.expected_return - cur.expected_return,
            sharpe_ratio: cand.sharpe_ratio - cur.sharpe_ratio,
            sortino_ratio: cand.sortino_ratio - cur.sortino_ratio,
            probability_of_profit: cand.probability_of_profit - cur.probability_of_profit,
            value_at_risk_95: diff(
                cur.value_at_risk(DELTA_CONFIDENCE),
                cand.value_at_risk(DELTA_CONFIDENCE),
            ),
            conditional_value_at_risk_95: diff(
                cur.conditional_value_at_risk(DELTA_CONFIDENCE),
                cand.conditional_value_at_risk(DELTA_CONFIDENCE),
            ),
            volatility: cur.volatility - cand.volatility,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current: MonteCarloResult,
    pub candidate: MonteCarloResult,
    pub delta: DeltaMetrics,
}

/// Simulate both allocations over the same history.
///
/// Both weight vectors are validated before any estimation or simulation.
pub fn compare(
    returns: &HistoricalReturns,
    current: &WeightVector,
    candidate: &WeightVector,
    config: &SimulationConfig,
) -> Result<ComparisonResult> {
    config.validate()?;
    let current_weights = current.aligned_to(returns)?;
    let candidate_weights = candidate.aligned_to(returns)?;

    let prepared = PreparedInputs::from_history(returns, config)?;
    let seed = resolve_seed(config.seed);

    tracing::info!(seed = seed, "Comparing current and candidate allocations");

    let current = run_prepared(&prepared, &current_weights, config, seed)?;
    let candidate_seed = seed.wrapping_add(CANDIDATE_SEED_OFFSET);
    let candidate = run_prepared(&prepared, &candidate_weights, config, candidate_seed)?;
    let delta = DeltaMetrics::between(&current, &candidate);

    tracing::info!(
        expected_return = delta.expected_return,
        sharpe = delta.sharpe_ratio,
        volatility = delta.volatility,
        "Comparison complete"
    );

    Ok(ComparisonResult {
        current,
        candidate,
        delta,
    })
}
