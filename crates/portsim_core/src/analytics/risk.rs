//! Scalar risk metrics of the final-return distribution

use super::paths::summarize_drawdowns;
use super::{percentile, population_std, sorted};
use crate::config::SimulationConfig;
use crate::model::{
    PortfolioPaths, ReturnPercentiles, RiskMetrics, SimulationWarning, TailRisk, TargetFraming,
    TargetProbability, WarningKind,
};

/// Compute the full metric bundle for one simulated portfolio.
///
/// Returns the metrics together with any `DegenerateMetric` warnings raised
/// along the way.
#[must_use]
pub fn compute_risk_metrics(
    portfolio: &PortfolioPaths,
    config: &SimulationConfig,
) -> (RiskMetrics, Vec<SimulationWarning>) {
    let final_values = portfolio.final_values();
    let final_returns = portfolio.final_returns();
    let returns_sorted = sorted(&final_returns);
    let values_sorted = sorted(&final_values);
    let n = final_returns.len();

    let mut warnings = Vec::new();

    let expected_return = final_returns.iter().sum::<f64>() / n as f64;
    let volatility = population_std(&final_returns);

    // Fewer than two losses have no dispersion of their own
    let losses: Vec<f64> = final_returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_deviation = if losses.len() > 1 {
        population_std(&losses)
    } else {
        volatility
    };

    let risk_free_return = config.risk_free_over_horizon();
    let excess = expected_return - risk_free_return;

    let sharpe_ratio = ratio_or_zero(excess, volatility, "Sharpe ratio", &mut warnings);
    let sortino_ratio = ratio_or_zero(excess, downside_deviation, "Sortino ratio", &mut warnings);

    let min_tail = config.risk.min_tail_observations;
    let tails: Vec<TailRisk> = config
        .risk
        .confidence_levels
        .iter()
        .map(|&confidence| {
            let (tail, warning) = tail_risk(&returns_sorted, confidence, min_tail);
            warnings.extend(warning);
            tail
        })
        .collect();

    let metrics = RiskMetrics {
        num_scenarios: n,
        expected_return,
        median_return: percentile(&returns_sorted, 0.50),
        best_return: returns_sorted.last().copied().unwrap_or(f64::NAN),
        worst_return: returns_sorted.first().copied().unwrap_or(f64::NAN),
        volatility,
        downside_deviation,
        risk_free_return,
        sharpe_ratio,
        sortino_ratio,
        probability_of_profit: probability_of_profit(&final_returns),
        expected_final_value: final_values.iter().sum::<f64>() / n as f64,
        median_final_value: percentile(&values_sorted, 0.50),
        percentiles: ReturnPercentiles {
            p5: percentile(&returns_sorted, 0.05),
            p25: percentile(&returns_sorted, 0.25),
            p50: percentile(&returns_sorted, 0.50),
            p75: percentile(&returns_sorted, 0.75),
            p95: percentile(&returns_sorted, 0.95),
        },
        tail_risk: tails,
        drawdown: summarize_drawdowns(portfolio),
    };

    tracing::debug!(
        expected_return = metrics.expected_return,
        volatility = metrics.volatility,
        sharpe = metrics.sharpe_ratio,
        "Computed risk metrics"
    );

    (metrics, warnings)
}

fn ratio_or_zero(
    numerator: f64,
    denominator: f64,
    name: &str,
    warnings: &mut Vec<SimulationWarning>,
) -> f64 {
    if denominator > 0.0 {
        return numerator / denominator;
    }
    tracing::warn!(metric = name, "Zero denominator, reporting 0");
    warnings.push(SimulationWarning::new(
        WarningKind::DegenerateMetric,
        format!("{name} undefined (zero dispersion), reported as 0"),
    ));
    0.0
}

/// VaR and CVaR of sorted final returns at `confidence`.
///
/// CVaR is `None` when fewer than `min_observations` returns fall at or
/// below the VaR threshold.
#[must_use]
pub fn tail_risk(
    sorted_returns: &[f64],
    confidence: f64,
    min_observations: usize,
) -> (TailRisk, Option<SimulationWarning>) {
    let value_at_risk = percentile(sorted_returns, 1.0 - confidence);
    let tail: Vec<f64> = sorted_returns
        .iter()
        .copied()
        .take_while(|r| *r <= value_at_risk)
        .collect();

    let enough = tail.len() >= min_observations && !tail.is_empty();
    let (conditional_value_at_risk, warning) = if enough {
        (Some(tail.iter().sum::<f64>() / tail.len() as f64), None)
    } else {
        let message = format!(
            "CVaR at {:.1}% undefined: {} tail observations, {} required",
            confidence * 100.0,
            tail.len(),
            min_observations
        );
        tracing::warn!(
            confidence = confidence,
            tail = tail.len(),
            "Tail too thin for CVaR"
        );
        let warning = SimulationWarning::new(WarningKind::DegenerateMetric, message);
        (None, Some(warning))
    };

    (
        TailRisk {
            confidence,
            value_at_risk,
            conditional_value_at_risk,
            tail_observations: tail.len(),
        },
        warning,
    )
}

/// Fraction of scenarios with a strictly positive final return
#[must_use]
pub fn probability_of_profit(final_returns: &[f64]) -> f64 {
    fraction(final_returns, |r| r > 0.0)
}

/// Fraction of scenarios reaching each target (final return `>=` target)
#[must_use]
pub fn target_probabilities(final_returns: &[f64], targets: &[f64]) -> Vec<TargetProbability> {
    targets
        .iter()
        .map(|&target| TargetProbability {
            target,
            probability: fraction(final_returns, |r| r >= target),
            framing: TargetFraming::for_target(target),
        })
        .collect()
}

fn fraction(values: &[f64], predicate: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| predicate(**v)).count() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One scenario per return, two steps each
    fn portfolio_from_returns(returns: &[f64]) -> PortfolioPaths {
        let data = returns
            .iter()
            .flat_map(|r| [100.0, 100.0 * (1.0 + r)])
            .collect();
        PortfolioPaths::new(returns.len(), 2, 100.0, data)
    }

    fn uniform_returns(n: usize) -> Vec<f64> {
        // -0.5 ..= 0.49 in steps of 0.01 for n = 100
        (0..n).map(|i| i as f64 / 100.0 - 0.5).collect()
    }

    #[test]
    fn test_tail_risk_ordering() {
        let returns = sorted(&uniform_returns(1_000));
        let (tail95, w95) = tail_risk(&returns, 0.95, 20);
        let (tail99, w99) = tail_risk(&returns, 0.99, 5);

        assert!(w95.is_none());
        assert!(w99.is_none());
        assert!(tail99.value_at_risk <= tail95.value_at_risk);
        for tail in [tail95, tail99] {
            let cvar = tail.conditional_value_at_risk.unwrap();
            assert!(cvar <= tail.value_at_risk);
        }
    }

    #[test]
    fn test_thin_tail_yields_no_cvar() {
        let returns = sorted(&uniform_returns(100));
        let (tail, warning) = tail_risk(&returns, 0.95, 20);

        // 5 of 100 scenarios sit at or below the 5th percentile
        assert!(tail.tail_observations < 20);
        assert_eq!(tail.conditional_value_at_risk, None);
        assert_eq!(warning.unwrap().kind, WarningKind::DegenerateMetric);
    }

    #[test]
    fn test_metrics_on_known_distribution() {
        let returns = [-0.10, 0.0, 0.10, 0.20];
        let portfolio = portfolio_from_returns(&returns);
        let config = SimulationConfig::default()
            .with_horizon_days(252)
            .with_risk_free_rate(0.0);
        let (metrics, _) = compute_risk_metrics(&portfolio, &config);

        assert!((metrics.expected_return - 0.05).abs() < 1e-12);
        assert!((metrics.volatility - 0.0125_f64.sqrt()).abs() < 1e-9);
        assert!((metrics.best_return - 0.20).abs() < 1e-12);
        assert!((metrics.worst_return + 0.10).abs() < 1e-12);
        // A 0% return is not a profit
        assert_eq!(metrics.probability_of_profit, 0.5);
        // A single loss: downside falls back to volatility
        assert_eq!(metrics.downside_deviation, metrics.volatility);
        let sharpe = 0.05 / metrics.volatility;
        assert!((metrics.sharpe_ratio - sharpe).abs() < 1e-12);
        assert!((metrics.expected_final_value - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dispersion_is_degenerate() {
        let portfolio = portfolio_from_returns(&[0.5; 50]);
        let (metrics, warnings) = compute_risk_metrics(&portfolio, &SimulationConfig::default());

        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.sortino_ratio, 0.0);
        let degenerate = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DegenerateMetric)
            .count();
        assert!(degenerate >= 2);
    }

    #[test]
    fn test_downside_deviation_needs_two_losses() {
        let config = SimulationConfig::default();

        // No losses, then a single loss: both fall back to total volatility
        for returns in [[0.0, 0.10, 0.20, 0.30], [-0.10, 0.0, 0.10, 0.20]] {
            let (metrics, _) = compute_risk_metrics(&portfolio_from_returns(&returns), &config);
            assert_eq!(metrics.downside_deviation, metrics.volatility);
            assert!(metrics.downside_deviation > 0.0);
        }

        // Two losses: population std of the losses alone
        let portfolio = portfolio_from_returns(&[-0.20, -0.10, 0.10, 0.20]);
        let (metrics, _) = compute_risk_metrics(&portfolio, &config);
        assert!((metrics.downside_deviation - 0.05).abs() < 1e-9);
        assert!(metrics.downside_deviation < metrics.volatility);
    }

    #[test]
    fn test_target_probabilities_use_inclusive_threshold() {
        let returns = [-0.25, -0.10, 0.0, 0.10, 0.30];
        let probs = target_probabilities(&returns, &[-0.10, 0.0, 0.30]);

        assert_eq!(probs[0].probability, 0.8);
        assert_eq!(probs[0].framing, TargetFraming::AvoidLoss);
        assert_eq!(probs[1].probability, 0.6);
        assert_eq!(probs[1].framing, TargetFraming::BreakEven);
        assert_eq!(probs[2].probability, 0.2);
        // Profit is strict
        assert_eq!(probability_of_profit(&returns), 0.4);
    }
}
