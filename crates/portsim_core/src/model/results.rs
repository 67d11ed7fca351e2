//! Simulation outputs
//!
//! Path containers produced by the simulator and aggregator, the typed
//! metric bundle computed by `analytics`, and the immutable
//! `MonteCarloResult` handed back to callers.

use serde::{Deserialize, Serialize};

use super::ids::AssetId;
use crate::config::ReturnSource;

/// Tolerance for floating-point percentile / confidence lookups
pub const PERCENTILE_TOLERANCE: f64 = 0.001;

// ============================================================================
// Path containers
// ============================================================================

/// Per-asset price paths stored as a flat `[scenario, step, asset]` array.
///
/// Step 0 holds the starting prices; step `horizon` the final ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPaths {
    num_scenarios: usize,
    num_steps: usize,
    num_assets: usize,
    data: Vec<f64>,
}

impl SimulatedPaths {
    /// Paths with every value set to `fill`
    #[must_use]
    pub fn filled(num_scenarios: usize, num_steps: usize, num_assets: usize, fill: f64) -> Self {
        Self {
            num_scenarios,
            num_steps,
            num_assets,
            data: vec![fill; num_scenarios * num_steps * num_assets],
        }
    }

    #[must_use]
    pub fn num_scenarios(&self) -> usize {
        self.num_scenarios
    }

    /// Number of stored time points (`horizon + 1`)
    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Values per scenario (`num_steps * num_assets`)
    #[must_use]
    pub fn scenario_stride(&self) -> usize {
        self.num_steps * self.num_assets
    }

    #[must_use]
    pub fn get(&self, scenario: usize, step: usize, asset: usize) -> f64 {
        self.data[scenario * self.scenario_stride() + step * self.num_assets + asset]
    }

    /// All steps of one scenario, `[step, asset]` row-major
    #[must_use]
    pub fn scenario(&self, scenario: usize) -> &[f64] {
        let stride = self.scenario_stride();
        &self.data[scenario * stride..(scenario + 1) * stride]
    }

    /// Asset values of one scenario at one step
    #[must_use]
    pub fn step(&self, scenario: usize, step: usize) -> &[f64] {
        let start = scenario * self.scenario_stride() + step * self.num_assets;
        &self.data[start..start + self.num_assets]
    }

    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Multiply every asset column by its factor (e.g. normalized prices to dollars).
    #[must_use]
    pub fn scaled(&self, factors: &[f64]) -> Self {
        let data = self
            .data
            .chunks(self.num_assets)
            .flat_map(|row| row.iter().zip(factors).map(|(p, f)| p * f))
            .collect();
        Self {
            num_scenarios: self.num_scenarios,
            num_steps: self.num_steps,
            num_assets: self.num_assets,
            data,
        }
    }
}

/// Portfolio dollar value per `[scenario, step]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPaths {
    num_scenarios: usize,
    num_steps: usize,
    initial_value: f64,
    data: Vec<f64>,
}

impl PortfolioPaths {
    pub(crate) fn new(
        num_scenarios: usize,
        num_steps: usize,
        initial_value: f64,
        data: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(data.len(), num_scenarios * num_steps);
        Self {
            num_scenarios,
            num_steps,
            initial_value,
            data,
        }
    }

    #[must_use]
    pub fn num_scenarios(&self) -> usize {
        self.num_scenarios
    }

    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    #[must_use]
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// Value path of one scenario
    #[must_use]
    pub fn scenario(&self, scenario: usize) -> &[f64] {
        &self.data[scenario * self.num_steps..(scenario + 1) * self.num_steps]
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.num_steps)
    }

    /// Portfolio value at the last step of each scenario
    #[must_use]
    pub fn final_values(&self) -> Vec<f64> {
        self.scenarios().map(|path| path[path.len() - 1]).collect()
    }

    /// `(V_T - V_0) / V_0` for each scenario
    #[must_use]
    pub fn final_returns(&self) -> Vec<f64> {
        self.final_values()
            .into_iter()
            .map(|v| (v - self.initial_value) / self.initial_value)
            .collect()
    }

    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// VaR / CVaR at one confidence level, both expressed as returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    /// Confidence level, e.g. 0.95
    pub confidence: f64,
    /// The `1 - confidence` percentile of final returns
    pub value_at_risk: f64,
    /// Mean of returns at or below `value_at_risk`; `None` when the tail is too thin
    pub conditional_value_at_risk: Option<f64>,
    /// Number of scenarios in the tail
    pub tail_observations: usize,
}

/// Fixed percentiles of the final-return distribution
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReturnPercentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Per-scenario maximum drawdown summary (positive fractions, 0.25 = 25%)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawdownStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
}

/// Scalar risk and performance statistics of one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub num_scenarios: usize,
    pub expected_return: f64,
    pub median_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    pub volatility: f64,
    pub downside_deviation: f64,
    /// Risk-free return over the simulation horizon
    pub risk_free_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub probability_of_profit: f64,
    pub expected_final_value: f64,
    pub median_final_value: f64,
    pub percentiles: ReturnPercentiles,
    pub tail_risk: Vec<TailRisk>,
    pub drawdown: DrawdownStats,
}

impl RiskMetrics {
    /// Tail statistics for a confidence level, if it was computed
    #[must_use]
    pub fn tail(&self, confidence: f64) -> Option<&TailRisk> {
        self.tail_risk
            .iter()
            .find(|t| (t.confidence - confidence).abs() < PERCENTILE_TOLERANCE)
    }

    #[must_use]
    pub fn value_at_risk(&self, confidence: f64) -> Option<f64> {
        self.tail(confidence).map(|t| t.value_at_risk)
    }

    #[must_use]
    pub fn conditional_value_at_risk(&self, confidence: f64) -> Option<f64> {
        self.tail(confidence)
            .and_then(|t| t.conditional_value_at_risk)
    }
}

/// How a return target is read by a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFraming {
    /// Target below 0%: probability of not losing more than this
    AvoidLoss,
    /// Target of exactly 0%
    BreakEven,
    /// Target above 0%: probability of gaining at least this
    AchieveGain,
}

impl TargetFraming {
    #[must_use]
    pub fn for_target(target: f64) -> Self {
        if target < 0.0 {
            Self::AvoidLoss
        } else if target > 0.0 {
            Self::AchieveGain
        } else {
            Self::BreakEven
        }
    }
}

/// Fraction of scenarios whose final return is at least `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetProbability {
    pub target: f64,
    pub probability: f64,
    pub framing: TargetFraming,
}

impl TargetProbability {
    /// Display label, e.g. "Avoid -10% loss" or "Achieve +20% gain"
    #[must_use]
    pub fn label(&self) -> String {
        let pct = self.target * 100.0;
        match self.framing {
            TargetFraming::AvoidLoss => format!("Avoid {pct:.0}% loss"),
            TargetFraming::BreakEven => "Break even".to_string(),
            TargetFraming::AchieveGain => format!("Achieve +{pct:.0}% gain"),
        }
    }
}

/// Portfolio value percentiles at every time step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentileBands {
    /// Percentiles as fractions, e.g. 0.05
    pub percentiles: Vec<f64>,
    /// values[`band`][`step`]
    pub values: Vec<Vec<f64>>,
}

impl PercentileBands {
    /// The value path for one percentile
    #[must_use]
    pub fn band(&self, percentile: f64) -> Option<&[f64]> {
        self.percentiles
            .iter()
            .position(|p| (p - percentile).abs() < PERCENTILE_TOLERANCE)
            .map(|i| self.values[i].as_slice())
    }
}

// ============================================================================
// Warnings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A metric resolved to its sentinel value (zero denominator, thin tail)
    DegenerateMetric,
    /// History shorter than the estimator needs to be meaningful
    ShortHistory,
    /// Covariance needed diagonal regularization before factorization
    Regularized,
}

/// Non-fatal quality flag attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl SimulationWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// Result bundle
// ============================================================================

/// Complete output of one Monte Carlo run. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Seed the run actually used (drawn from the OS when none was configured)
    pub seed: u64,
    pub return_source: ReturnSource,
    pub assets: Vec<AssetId>,
    /// Weights in column order
    pub weights: Vec<f64>,
    /// Annualized expected return per asset fed to the simulator
    pub expected_returns: Vec<f64>,
    pub portfolio: PortfolioPaths,
    pub final_returns: Vec<f64>,
    pub metrics: RiskMetrics,
    pub probabilities: Vec<TargetProbability>,
    pub bands: PercentileBands,
    /// Per-asset dollar paths, kept only when requested
    pub asset_paths: Option<SimulatedPaths>,
    pub warnings: Vec<SimulationWarning>,
}

impl MonteCarloResult {
    /// Probability of reaching `target`, if it was one of the configured targets
    #[must_use]
    pub fn probability_of(&self, target: f64) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|p| (p.target - target).abs() < PERCENTILE_TOLERANCE)
            .map(|p| p.probability)
    }

    #[must_use]
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_paths_indexing() {
        let mut paths = SimulatedPaths::filled(2, 3, 2, 1.0);
        // scenario 1, step 2, asset 1 is the last element
        *paths.data_mut().last_mut().unwrap() = 5.0;

        assert_eq!(paths.scenario_stride(), 6);
        assert_eq!(paths.get(1, 2, 1), 5.0);
        assert_eq!(paths.step(1, 2), &[1.0, 5.0]);

        let dollars = paths.scaled(&[10.0, 100.0]);
        assert_eq!(dollars.get(0, 0, 0), 10.0);
        assert_eq!(dollars.get(1, 2, 1), 500.0);
    }

    #[test]
    fn test_portfolio_final_returns() {
        let paths = PortfolioPaths::new(2, 2, 100.0, vec![100.0, 110.0, 100.0, 80.0]);
        assert_eq!(paths.final_values(), vec![110.0, 80.0]);
        let returns = paths.final_returns();
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_target_framing_labels() {
        let loss = TargetProbability {
            target: -0.10,
            probability: 0.9,
            framing: TargetFraming::for_target(-0.10),
        };
        assert_eq!(loss.framing, TargetFraming::AvoidLoss);
        assert_eq!(loss.label(), "Avoid -10% loss");

        assert_eq!(TargetFraming::for_target(0.0), TargetFraming::BreakEven);
        assert_eq!(TargetFraming::for_target(0.2), TargetFraming::AchieveGain);
    }
}
