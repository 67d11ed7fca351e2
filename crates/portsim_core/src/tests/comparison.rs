//! Current vs candidate allocations over one shared history

use super::fixtures::stock_bond_history;
use crate::comparison::{CANDIDATE_SEED_OFFSET, compare};
use crate::config::SimulationConfig;
use crate::model::WeightVector;
use crate::simulation::monte_carlo_simulate;

fn config() -> SimulationConfig {
    SimulationConfig::default()
        .with_scenarios(4_000)
        .with_horizon_days(126)
        .with_seed(100)
}

#[test]
fn test_candidate_runs_on_offset_seed() {
    let history = stock_bond_history(11);
    let current = WeightVector::new([("STOCK", 0.8), ("BOND", 0.2)]);
    let candidate = WeightVector::new([("STOCK", 0.4), ("BOND", 0.6)]);

    let comparison = compare(&history, &current, &candidate, &config()).unwrap();

    assert_eq!(comparison.current.seed, 100);
    assert_eq!(comparison.candidate.seed, 100 + CANDIDATE_SEED_OFFSET);

    // Each side replays as a standalone run with its own seed
    let alone = monte_carlo_simulate(&history, &candidate, &config().with_seed(101)).unwrap();
    assert_eq!(comparison.candidate.final_returns, alone.final_returns);
    assert_eq!(comparison.current.expected_returns, alone.expected_returns);
}

#[test]
fn test_deltas_favor_the_less_volatile_candidate_on_volatility() {
    let history = stock_bond_history(11);
    let current = WeightVector::new([("STOCK", 0.95), ("BOND", 0.05)]);
    let candidate = WeightVector::new([("STOCK", 0.05), ("BOND", 0.95)]);

    let comparison = compare(&history, &current, &candidate, &config()).unwrap();
    let delta = comparison.delta;
    let (cur, cand) = (&comparison.current.metrics, &comparison.candidate.metrics);

    // Positive volatility delta means the candidate is calmer
    assert!(delta.volatility > 0.0);
    assert_eq!(delta.volatility, cur.volatility - cand.volatility);
    assert_eq!(delta.sharpe_ratio, cand.sharpe_ratio - cur.sharpe_ratio);
    assert_eq!(
        delta.expected_return,
        cand.expected_return - cur.expected_return
    );

    // A calmer portfolio has a shallower loss threshold
    let var_delta = delta.value_at_risk_95.unwrap();
    assert!(var_delta > 0.0);
    let cand_var = cand.value_at_risk(0.95).unwrap();
    let cur_var = cur.value_at_risk(0.95).unwrap();
    assert_eq!(var_delta, cand_var - cur_var);
    assert!(delta.conditional_value_at_risk_95.is_some());
}

#[test]
fn test_identical_allocations_differ_only_by_sampling() {
    let history = stock_bond_history(12);
    let weights = WeightVector::new([("STOCK", 0.5), ("BOND", 0.5)]);

    let comparison = compare(&history, &weights, &weights, &config()).unwrap();

    assert_ne!(
        comparison.current.final_returns,
        comparison.candidate.final_returns
    );
    assert!(comparison.delta.expected_return.abs() < 0.01);
    assert!(comparison.delta.probability_of_profit.abs() < 0.05);
}
