//! Correlated GBM path simulation and the Monte Carlo pipeline
//!
//! Every asset's normalized price starts at 1.0 and evolves as
//!
//! ```text
//! p_t = p_{t-1} · exp((μ_i - σ_i²/2)·dt + √dt·(L·z)_i)
//! ```
//!
//! where `L` is the Cholesky factor of the annualized covariance and `z` is a
//! vector of independent standard normals. Scenarios are processed in fixed
//! batches, each with its own RNG seeded from a master RNG, so the output is
//! identical whether batches run on one thread or many.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analytics::{compute_risk_metrics, percentile_bands, target_probabilities};
use crate::config::{DT, ReturnSource, SimulationConfig};
use crate::correlation::{CorrelationFactor, factorize};
use crate::error::{Result, SimulationError};
use crate::estimator::estimate_expected_returns;
use crate::model::{
    AssetId, HistoricalReturns, MonteCarloResult, SimulatedPaths, SimulationWarning, WarningKind,
    WeightVector,
};
use crate::moments::{MomentEstimate, estimate_moments};
use crate::portfolio::{aggregate_portfolio, dollar_allocations};

/// Scenarios per RNG batch
pub const BATCH_SIZE: usize = 256;

// ============================================================================
// Path simulation
// ============================================================================

/// Simulate normalized price paths for every asset.
///
/// `expected_returns` are annual and in the factor's column order. The result
/// holds `horizon_days + 1` steps per scenario, step 0 being 1.0.
pub fn simulate_paths(
    factor: &CorrelationFactor,
    expected_returns: &[f64],
    horizon_days: usize,
    num_scenarios: usize,
    seed: u64,
) -> Result<SimulatedPaths> {
    let num_assets = factor.dim();
    if expected_returns.len() != num_assets {
        return Err(SimulationError::Config(format!(
            "{} expected returns supplied for {} assets",
            expected_returns.len(),
            num_assets
        )));
    }
    if expected_returns.iter().any(|mu| !mu.is_finite()) {
        return Err(SimulationError::Config(
            "expected returns must be finite".to_string(),
        ));
    }
    if num_scenarios == 0 || horizon_days == 0 {
        return Err(SimulationError::Config(
            "num_scenarios and horizon_days must be positive".to_string(),
        ));
    }

    let drift_dt: Vec<f64> = expected_returns
        .iter()
        .zip(factor.variances())
        .map(|(mu, var)| (mu - 0.5 * var) * DT)
        .collect();
    let num_steps = horizon_days + 1;

    let mut paths = SimulatedPaths::filled(num_scenarios, num_steps, num_assets, 1.0);
    let chunk_len = BATCH_SIZE * paths.scenario_stride();
    let seeds = batch_seeds(seed, num_scenarios.div_ceil(BATCH_SIZE));

    tracing::debug!(
        batches = seeds.len(),
        scenarios = num_scenarios,
        steps = horizon_days,
        assets = num_assets,
        "Simulating correlated paths"
    );

    #[cfg(feature = "parallel")]
    paths
        .data_mut()
        .par_chunks_mut(chunk_len)
        .zip(seeds.par_iter())
        .for_each(|(chunk, &batch_seed)| {
            simulate_batch(chunk, batch_seed, factor, &drift_dt, num_steps);
        });

    #[cfg(not(feature = "parallel"))]
    paths
        .data_mut()
        .chunks_mut(chunk_len)
        .zip(seeds.iter())
        .for_each(|(chunk, &batch_seed)| {
            simulate_batch(chunk, batch_seed, factor, &drift_dt, num_steps);
        });

    Ok(paths)
}

/// One sub-seed per batch, drawn in batch order from a master RNG.
pub(crate) fn batch_seeds(seed: u64, num_batches: usize) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(seed);
    (0..num_batches).map(|_| master.next_u64()).collect()
}

/// Fill one batch of scenarios in place. Time-major: every scenario of the
/// batch advances one step before any advances the next.
fn simulate_batch(
    chunk: &mut [f64],
    seed: u64,
    factor: &CorrelationFactor,
    drift_dt: &[f64],
    num_steps: usize,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_assets = drift_dt.len();
    let stride = num_steps * num_assets;
    let batch_len = chunk.len() / stride;
    let sqrt_dt = DT.sqrt();

    let mut z = vec![0.0; num_assets];
    let mut shock = vec![0.0; num_assets];

    for t in 1..num_steps {
        for scenario in 0..batch_len {
            for zi in z.iter_mut() {
                *zi = rng.sample(StandardNormal);
            }
            factor.correlate(&z, &mut shock);

            let start = scenario * stride + (t - 1) * num_assets;
            let (prev, next) = chunk[start..start + 2 * num_assets].split_at_mut(num_assets);
            for i in 0..num_assets {
                next[i] = prev[i] * (drift_dt[i] + sqrt_dt * shock[i]).exp();
            }
        }
    }
}

/// The configured seed, or a fresh one from the thread RNG
#[must_use]
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().next_u64())
}

// ============================================================================
// Monte Carlo pipeline
// ============================================================================

/// Everything derived from the inputs before any path is drawn. Shared by
/// both runs of a comparison.
#[derive(Debug, Clone)]
pub(crate) struct PreparedInputs {
    pub assets: Vec<AssetId>,
    pub factor: CorrelationFactor,
    pub expected_returns: Vec<f64>,
    pub return_source: ReturnSource,
    pub warnings: Vec<SimulationWarning>,
}

impl PreparedInputs {
    pub(crate) fn from_history(
        returns: &HistoricalReturns,
        config: &SimulationConfig,
    ) -> Result<Self> {
        let moments = estimate_moments(returns, true)?;
        let mut prepared = Self::from_annual_moments(returns.assets(), &moments)?;

        if config.return_source == ReturnSource::ProbabilityWeighted {
            let estimate = estimate_expected_returns(returns, &config.estimator)?;
            prepared.expected_returns = estimate.expected_returns();
            prepared.return_source = ReturnSource::ProbabilityWeighted;
            prepared.warnings.extend(estimate.warnings);
        }

        Ok(prepared)
    }

    pub(crate) fn from_moments(
        assets: &[AssetId],
        moments: &MomentEstimate,
        config: &SimulationConfig,
    ) -> Result<Self> {
        if assets.len() != moments.num_assets() {
            return Err(SimulationError::Config(format!(
                "{} asset ids supplied for moments of {} assets",
                assets.len(),
                moments.num_assets()
            )));
        }
        if config.return_source == ReturnSource::ProbabilityWeighted {
            return Err(SimulationError::Config(
                "probability-weighted returns need a return history, not bare moments".to_string(),
            ));
        }
        Self::from_annual_moments(assets, &moments.annualized())
    }

    fn from_annual_moments(assets: &[AssetId], moments: &MomentEstimate) -> Result<Self> {
        let factor = factorize(&moments.covariance, assets)?;

        let mut warnings = Vec::new();
        if factor.was_regularized() {
            warnings.push(SimulationWarning::new(
                WarningKind::Regularized,
                format!(
                    "covariance regularized with epsilon {:e} before factorization",
                    factor.regularization()
                ),
            ));
        }

        Ok(Self {
            assets: assets.to_vec(),
            factor,
            expected_returns: moments.means.clone(),
            return_source: ReturnSource::HistoricalMean,
            warnings,
        })
    }
}

/// Run a full simulation from a return history.
///
/// Weights are validated against the history's columns before anything is
/// estimated or simulated.
pub fn monte_carlo_simulate(
    returns: &HistoricalReturns,
    weights: &WeightVector,
    config: &SimulationConfig,
) -> Result<MonteCarloResult> {
    config.validate()?;
    let weights = weights.aligned_to(returns)?;
    let prepared = PreparedInputs::from_history(returns, config)?;
    run_prepared(&prepared, &weights, config, resolve_seed(config.seed))
}

/// Run a full simulation from known daily moments instead of a history.
///
/// Expected returns are the annualized means, so `return_source` must be
/// `HistoricalMean`.
pub fn monte_carlo_simulate_with_moments(
    assets: &[AssetId],
    moments: &MomentEstimate,
    weights: &WeightVector,
    config: &SimulationConfig,
) -> Result<MonteCarloResult> {
    config.validate()?;
    let weights = weights.aligned_to_assets(assets)?;
    let prepared = PreparedInputs::from_moments(assets, moments, config)?;
    run_prepared(&prepared, &weights, config, resolve_seed(config.seed))
}

pub(crate) fn run_prepared(
    prepared: &PreparedInputs,
    weights: &[f64],
    config: &SimulationConfig,
    seed: u64,
) -> Result<MonteCarloResult> {
    tracing::info!(
        scenarios = config.num_scenarios,
        horizon_days = config.horizon_days,
        assets = prepared.assets.len(),
        seed = seed,
        "Starting Monte Carlo simulation"
    );

    let paths = simulate_paths(
        &prepared.factor,
        &prepared.expected_returns,
        config.horizon_days,
        config.num_scenarios,
        seed,
    )?;
    let portfolio = aggregate_portfolio(&paths, weights, config.initial_value)?;
    let final_returns = portfolio.final_returns();

    let (metrics, metric_warnings) = compute_risk_metrics(&portfolio, config);
    let probabilities = target_probabilities(&final_returns, &config.risk.return_targets);
    let bands = percentile_bands(&portfolio, &config.risk.band_percentiles);
    let asset_paths = config
        .keep_asset_paths
        .then(|| paths.scaled(&dollar_allocations(weights, config.initial_value)));

    let mut warnings = prepared.warnings.clone();
    warnings.extend(metric_warnings);

    tracing::info!(
        expected_return = metrics.expected_return,
        probability_of_profit = metrics.probability_of_profit,
        warnings = warnings.len(),
        "Monte Carlo simulation complete"
    );

    Ok(MonteCarloResult {
        seed,
        return_source: prepared.return_source,
        assets: prepared.assets.clone(),
        weights: weights.to_vec(),
        expected_returns: prepared.expected_returns.clone(),
        portfolio,
        final_returns,
        metrics,
        probabilities,
        bands,
        asset_paths,
        warnings,
    })
}
