//! Portfolio weights keyed by asset
//!
//! Weights come from an allocation collaborator. They are checked against the
//! returns table before any simulation work and are never renormalized or
//! reordered: a mismatch is a caller bug, not something to paper over.

use serde::{Deserialize, Serialize};

use crate::error::WeightAlignmentError;
use crate::model::{AssetId, HistoricalReturns};

/// Maximum allowed distance of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-2;

/// Long-only portfolio weights, one per asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    entries: Vec<(AssetId, f64)>,
}

impl WeightVector {
    #[must_use]
    pub fn new<I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, f64)>,
        A: Into<AssetId>,
    {
        Self {
            entries: entries.into_iter().map(|(a, w)| (a.into(), w)).collect(),
        }
    }

    /// Equal weights across every column of `returns`
    #[must_use]
    pub fn equal(returns: &HistoricalReturns) -> Self {
        let w = 1.0 / returns.num_assets() as f64;
        Self::new(returns.assets().iter().cloned().map(|a| (a, w)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, f64)> {
        self.entries.iter().map(|(a, w)| (a, *w))
    }

    /// Check the weights against the column layout of `returns` and return the
    /// raw weights in column order.
    pub fn aligned_to(
        &self,
        returns: &HistoricalReturns,
    ) -> Result<Vec<f64>, WeightAlignmentError> {
        self.aligned_to_assets(returns.assets())
    }

    /// Same as [`Self::aligned_to`] for a bare list of asset ids.
    pub fn aligned_to_assets(&self, assets: &[AssetId]) -> Result<Vec<f64>, WeightAlignmentError> {
        if self.entries.len() != assets.len() {
            return Err(WeightAlignmentError::LengthMismatch {
                weights: self.entries.len(),
                assets: assets.len(),
            });
        }

        for (position, ((asset, weight), expected)) in self.entries.iter().zip(assets).enumerate() {
            if asset != expected {
                return Err(WeightAlignmentError::OrderMismatch {
                    position,
                    expected: expected.clone(),
                    found: asset.clone(),
                });
            }
            if !weight.is_finite() {
                return Err(WeightAlignmentError::NonFiniteWeight {
                    asset: asset.clone(),
                });
            }
            if *weight < 0.0 {
                return Err(WeightAlignmentError::NegativeWeight {
                    asset: asset.clone(),
                    weight: *weight,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightAlignmentError::SumNotOne {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }

        Ok(self.entries.iter().map(|(_, w)| *w).collect())
    }
}
