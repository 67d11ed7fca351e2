//! Historical-mean vs probability-weighted drift

use super::fixtures::{stock_bond_history, synthetic_history};
use crate::config::{ReturnSource, SimulationConfig};
use crate::estimator::estimate_expected_returns;
use crate::model::{WarningKind, WeightVector};
use crate::moments::estimate_moments;
use crate::simulation::monte_carlo_simulate;

#[test]
fn test_historical_mean_source_uses_annualized_means() {
    let history = stock_bond_history(21);
    let weights = WeightVector::new([("STOCK", 0.6), ("BOND", 0.4)]);
    let config = SimulationConfig::default()
        .with_scenarios(200)
        .with_seed(21);

    let result = monte_carlo_simulate(&history, &weights, &config).unwrap();
    let moments = estimate_moments(&history, true).unwrap();

    assert_eq!(result.return_source, ReturnSource::HistoricalMean);
    assert_eq!(result.expected_returns, moments.means);
}

#[test]
fn test_probability_weighted_source_uses_estimator() {
    let history = stock_bond_history(21);
    let weights = WeightVector::new([("STOCK", 0.6), ("BOND", 0.4)]);
    let config = SimulationConfig::default()
        .with_scenarios(200)
        .with_seed(1)
        .with_return_source(ReturnSource::ProbabilityWeighted);

    let result = monte_carlo_simulate(&history, &weights, &config).unwrap();
    let estimate = estimate_expected_returns(&history, &config.estimator).unwrap();

    assert_eq!(result.return_source, ReturnSource::ProbabilityWeighted);
    assert_eq!(result.expected_returns, estimate.expected_returns());
    assert!(!result.has_warning(WarningKind::ShortHistory));
}

#[test]
fn test_short_history_warning_reaches_result() {
    let history = synthetic_history(&["STOCK"], &[0.0005], &[vec![0.0001]], 40, 5);
    let weights = WeightVector::new([("STOCK", 1.0)]);
    let config = SimulationConfig::default()
        .with_scenarios(100)
        .with_seed(2)
        .with_return_source(ReturnSource::ProbabilityWeighted);

    let result = monte_carlo_simulate(&history, &weights, &config).unwrap();
    assert!(result.has_warning(WarningKind::ShortHistory));
}
