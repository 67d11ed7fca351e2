//! Simulation configuration
//!
//! The main configuration type is `SimulationConfig`, which contains everything
//! needed to run a simulation besides the data itself. All fields have serde
//! defaults so a partial document (or `SimulationConfig::default()`) is a
//! usable starting point.
//!
//! ```ignore
//! use portsim_core::config::{ReturnSource, SimulationConfig};
//!
//! let config = SimulationConfig::default()
//!     .with_scenarios(20_000)
//!     .with_horizon_days(504)
//!     .with_seed(7)
//!     .with_return_source(ReturnSource::ProbabilityWeighted);
//! config.validate()?;
//! ```

mod estimator;
mod risk;

pub use estimator::{EstimatorConfig, LookbackWindow};
pub use risk::RiskConfig;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Trading days per year; also the annualization factor for daily moments
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simulation time step in years (one trading day)
pub const DT: f64 = 1.0 / TRADING_DAYS_PER_YEAR;

/// Where the simulator's drift vector comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnSource {
    /// Annualized arithmetic mean of the full history
    #[default]
    HistoricalMean,
    /// Multi-window blended estimate (see `estimator`)
    ProbabilityWeighted,
}

fn default_num_scenarios() -> usize {
    10_000
}

fn default_horizon_days() -> usize {
    252
}

fn default_initial_value() -> f64 {
    100_000.0
}

fn default_risk_free_rate() -> f64 {
    0.02
}

/// Complete configuration for one simulation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of independent scenarios (paths)
    #[serde(default = "default_num_scenarios")]
    pub num_scenarios: usize,

    /// Horizon in trading days
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Starting portfolio value in dollars
    #[serde(default = "default_initial_value")]
    pub initial_value: f64,

    /// Seed for the run's RNG; a fresh one is drawn and reported when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub return_source: ReturnSource,

    /// Annual risk-free rate used by Sharpe and Sortino
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Keep per-asset dollar paths in the result
    #[serde(default)]
    pub keep_asset_paths: bool,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub risk: RiskConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_scenarios: default_num_scenarios(),
            horizon_days: default_horizon_days(),
            initial_value: default_initial_value(),
            seed: None,
            return_source: ReturnSource::default(),
            risk_free_rate: default_risk_free_rate(),
            keep_asset_paths: false,
            estimator: EstimatorConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn with_scenarios(mut self, num_scenarios: usize) -> Self {
        self.num_scenarios = num_scenarios;
        self
    }

    #[must_use]
    pub fn with_horizon_days(mut self, horizon_days: usize) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    #[must_use]
    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_return_source(mut self, return_source: ReturnSource) -> Self {
        self.return_source = return_source;
        self
    }

    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    #[must_use]
    pub fn with_asset_paths(mut self, keep: bool) -> Self {
        self.keep_asset_paths = keep;
        self
    }

    /// Horizon length in years
    #[must_use]
    pub fn horizon_years(&self) -> f64 {
        self.horizon_days as f64 * DT
    }

    /// Risk-free return accrued over the horizon
    #[must_use]
    pub fn risk_free_over_horizon(&self) -> f64 {
        self.risk_free_rate * self.horizon_years()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_scenarios == 0 {
            return Err(SimulationError::Config(
                "num_scenarios must be positive".to_string(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(SimulationError::Config(
                "horizon_days must be positive".to_string(),
            ));
        }
        if !(self.initial_value.is_finite() && self.initial_value > 0.0) {
            return Err(SimulationError::Config(format!(
                "initial_value must be positive and finite, got {}",
                self.initial_value
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(SimulationError::Config(
                "risk_free_rate must be finite".to_string(),
            ));
        }
        self.estimator.validate()?;
        self.risk.validate()
    }
}
