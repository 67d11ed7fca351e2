//! Correlated stochastic portfolio simulation
//!
//! This crate turns a table of historical daily returns and a set of
//! portfolio weights into a Monte Carlo distribution of portfolio outcomes.
//! It supports:
//! - Sample moments (mean vector, covariance) with annualization
//! - Cholesky factorization with a single regularized retry
//! - Historical-mean or probability-weighted expected returns
//! - Correlated geometric Brownian motion paths, reproducible from a seed
//! - VaR/CVaR, Sharpe/Sortino, percentiles, target probabilities,
//!   percentile bands and drawdowns
//! - Side-by-side comparison of a current and a candidate allocation
//!
//! ```ignore
//! use portsim_core::{SimulationConfig, WeightVector, monte_carlo_simulate};
//!
//! let config = SimulationConfig::default().with_scenarios(10_000).with_seed(42);
//! let weights = WeightVector::new([("SPY", 0.6), ("AGG", 0.4)]);
//! let result = monte_carlo_simulate(&returns, &weights, &config)?;
//! println!("VaR 95%: {:?}", result.metrics.value_at_risk(0.95));
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analytics;
pub mod comparison;
pub mod correlation;
pub mod error;
pub mod estimator;
pub mod moments;
pub mod portfolio;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analytics::compute_risk_metrics;
pub use comparison::{ComparisonResult, DeltaMetrics, compare};
pub use config::{ReturnSource, SimulationConfig};
pub use correlation::{CorrelationFactor, factorize};
pub use error::{DataError, Result, SimulationError, WeightAlignmentError};
pub use estimator::estimate_expected_returns;
pub use model::{AssetId, HistoricalReturns, MonteCarloResult, WeightVector};
pub use moments::{MomentEstimate, estimate_moments};
pub use portfolio::aggregate_portfolio;
pub use simulation::{monte_carlo_simulate, monte_carlo_simulate_with_moments, simulate_paths};
