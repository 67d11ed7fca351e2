//! Distributional analytics settings

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// VaR/CVaR confidence levels, e.g. 0.95
    pub confidence_levels: Vec<f64>,
    /// Final-return targets for probability-of-target reporting
    pub return_targets: Vec<f64>,
    /// CVaR needs at least this many tail scenarios
    pub min_tail_observations: usize,
    /// Percentiles (as fractions) tracked over time
    pub band_percentiles: Vec<f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_levels: vec![0.95, 0.99],
            return_targets: vec![-0.20, -0.10, 0.0, 0.05, 0.10, 0.15, 0.20, 0.30, 0.50],
            min_tail_observations: 20,
            band_percentiles: vec![0.05, 0.25, 0.50, 0.75, 0.95],
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(c) = self
            .confidence_levels
            .iter()
            .find(|c| !(**c > 0.0 && **c < 1.0))
        {
            return Err(SimulationError::Config(format!(
                "confidence level {c} must be strictly between 0 and 1"
            )));
        }
        if let Some(p) = self
            .band_percentiles
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(SimulationError::Config(format!(
                "band percentile {p} must be within [0, 1]"
            )));
        }
        if self.return_targets.iter().any(|t| !t.is_finite()) {
            return Err(SimulationError::Config(
                "return targets must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_levels_must_be_fractions() {
        let config = RiskConfig {
            confidence_levels: vec![95.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(RiskConfig::default().validate().is_ok());
    }
}
