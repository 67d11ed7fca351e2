//! Probability-weighted expected returns
//!
//! An alternative to the plain historical mean. Each asset's history is read
//! through several lookback windows; each window produces a damped estimate
//!
//! ```text
//! estimate = (a·mean_return + b·momentum) · volatility_penalty · confidence
//! ```
//!
//! and the windows are blended with fixed probability weights. High
//! volatility shrinks an estimate toward zero, and so does a mean that is not
//! statistically distinguishable from zero.

use serde::{Deserialize, Serialize};

use crate::config::{EstimatorConfig, LookbackWindow, TRADING_DAYS_PER_YEAR};
use crate::error::{Result, SimulationError};
use crate::model::{AssetId, HistoricalReturns, SimulationWarning, WarningKind};
use crate::moments::{MIN_OBSERVATIONS, mean, sample_std};

/// Diagnostic breakdown of one lookback window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowEstimate {
    /// Configured window length
    pub days: usize,
    /// Observations actually used (less than `days` for short histories)
    pub observations: usize,
    pub weight: f64,
    pub mean_return: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub volatility_penalty: f64,
    pub confidence: f64,
    pub estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEstimate {
    pub asset: AssetId,
    /// Annualized blended expected return
    pub expected_return: f64,
    pub windows: Vec<WindowEstimate>,
}

/// Output of [`estimate_expected_returns`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnEstimate {
    pub assets: Vec<AssetEstimate>,
    pub warnings: Vec<SimulationWarning>,
}

impl ReturnEstimate {
    /// Blended expected returns in column order
    #[must_use]
    pub fn expected_returns(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.expected_return).collect()
    }
}

/// Blend per-window estimates into one annualized expected return per asset.
pub fn estimate_expected_returns(
    returns: &HistoricalReturns,
    config: &EstimatorConfig,
) -> Result<ReturnEstimate> {
    config.validate()?;

    let n = returns.len();
    if n < MIN_OBSERVATIONS {
        return Err(SimulationError::InsufficientData {
            required: MIN_OBSERVATIONS,
            available: n,
        });
    }

    let mut warnings = Vec::new();
    if n < config.min_history {
        tracing::warn!(
            observations = n,
            min_history = config.min_history,
            "History shorter than the estimator's shortest window"
        );
        warnings.push(SimulationWarning::new(
            WarningKind::ShortHistory,
            format!(
                "only {n} observations available, estimates use fewer than {} days",
                config.min_history
            ),
        ));
    }

    let assets = returns
        .assets()
        .iter()
        .zip(returns.columns())
        .map(|(asset, column)| {
            let windows: Vec<WindowEstimate> = config
                .windows
                .iter()
                .map(|window| estimate_window(column, window, config))
                .collect();
            let expected_return = windows.iter().map(|w| w.weight * w.estimate).sum();

            tracing::debug!(
                asset = %asset,
                expected_return = expected_return,
                "Blended expected return"
            );

            AssetEstimate {
                asset: asset.clone(),
                expected_return,
                windows,
            }
        })
        .collect();

    Ok(ReturnEstimate { assets, warnings })
}

fn estimate_window(
    column: &[f64],
    window: &LookbackWindow,
    config: &EstimatorConfig,
) -> WindowEstimate {
    let data = &column[column.len().saturating_sub(window.days)..];
    let observations = data.len();

    let daily_mean = mean(data);
    let daily_std = sample_std(data);

    let mean_return = daily_mean * TRADING_DAYS_PER_YEAR;
    let recent = &data[observations.saturating_sub(config.momentum_days)..];
    let momentum = mean(recent) * TRADING_DAYS_PER_YEAR;

    let volatility = daily_std * TRADING_DAYS_PER_YEAR.sqrt();
    let volatility_penalty = 1.0 - volatility / (volatility + config.volatility_pivot);

    let confidence = if daily_std > 0.0 {
        let t_stat = daily_mean / (daily_std / (observations as f64).sqrt());
        (t_stat.abs() / config.t_stat_scale).min(1.0)
    } else if daily_mean != 0.0 {
        1.0
    } else {
        0.0
    };

    let drift = config.mean_coefficient * mean_return + config.momentum_coefficient * momentum;
    let estimate = drift * volatility_penalty * confidence;

    WindowEstimate {
        days: window.days,
        observations,
        weight: window.weight,
        mean_return,
        momentum,
        volatility,
        volatility_penalty,
        confidence,
        estimate,
    }
}
