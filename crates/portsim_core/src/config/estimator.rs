//! Probability-weighted return estimator settings
//!
//! The defaults are the calibrated values the estimator has always used
//! (60/120/252-day windows at 50/30/20%, a 20-day momentum window, a 0.6/0.4
//! mean/momentum blend, a 20% volatility pivot and full confidence once
//! |t| reaches 2). Treat them as fixed unless deliberately recalibrating.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// One lookback window and its blend probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookbackWindow {
    /// Window length in trading days
    pub days: usize,
    /// Probability weight of this window in the blend
    pub weight: f64,
}

impl LookbackWindow {
    #[must_use]
    pub const fn new(days: usize, weight: f64) -> Self {
        Self { days, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Shortest window first; weights must sum to 1
    pub windows: Vec<LookbackWindow>,
    /// Trailing observations used for the momentum signal
    pub momentum_days: usize,
    pub mean_coefficient: f64,
    pub momentum_coefficient: f64,
    /// Annualized volatility at which the penalty factor is 0.5
    pub volatility_pivot: f64,
    /// |t| at which a window reaches full confidence
    pub t_stat_scale: f64,
    /// Histories shorter than this are flagged as `ShortHistory`
    pub min_history: usize,
}

impl EstimatorConfig {
    pub const DEFAULT_WINDOWS: [LookbackWindow; 3] = [
        LookbackWindow::new(60, 0.5),
        LookbackWindow::new(120, 0.3),
        LookbackWindow::new(252, 0.2),
    ];

    pub fn validate(&self) -> Result<()> {
        if self.windows.is_empty() {
            return Err(SimulationError::Config(
                "estimator needs at least one lookback window".to_string(),
            ));
        }
        if let Some(w) = self
            .windows
            .iter()
            .find(|w| w.days == 0 || !(w.weight.is_finite() && w.weight >= 0.0))
        {
            return Err(SimulationError::Config(format!(
                "invalid lookback window ({} days, weight {})",
                w.days, w.weight
            )));
        }
        let total: f64 = self.windows.iter().map(|w| w.weight).sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(SimulationError::Config(format!(
                "lookback window weights sum to {total}, expected 1.0"
            )));
        }
        if self.momentum_days == 0 {
            return Err(SimulationError::Config(
                "momentum_days must be positive".to_string(),
            ));
        }
        if !(self.volatility_pivot > 0.0 && self.t_stat_scale > 0.0) {
            return Err(SimulationError::Config(
                "volatility_pivot and t_stat_scale must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            windows: Self::DEFAULT_WINDOWS.to_vec(),
            momentum_days: 20,
            mean_coefficient: 0.6,
            momentum_coefficient: 0.4,
            volatility_pivot: 0.20,
            t_stat_scale: 2.0,
            min_history: 60,
        }
    }
}
