use thiserror::Error;

use crate::model::AssetId;

/// Problems with the shape or contents of a `HistoricalReturns` table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("returns table has no assets")]
    NoAssets,
    #[error("{assets} asset ids supplied for {columns} columns")]
    ColumnCountMismatch { assets: usize, columns: usize },
    #[error("asset {0} appears more than once")]
    DuplicateAsset(AssetId),
    #[error("asset {asset} has {found} observations, expected {expected}")]
    RaggedColumn {
        asset: AssetId,
        expected: usize,
        found: usize,
    },
    #[error("dates must be strictly increasing (row {row})")]
    UnorderedDates { row: usize },
    #[error("asset {asset} has a missing or non-finite return at row {row}")]
    NonFiniteReturn { asset: AssetId, row: usize },
}

/// Weight vectors that cannot be applied to a returns table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightAlignmentError {
    #[error("{weights} weights supplied for {assets} assets")]
    LengthMismatch { weights: usize, assets: usize },
    #[error("weight at position {position} is for {found}, but the returns column is {expected}")]
    OrderMismatch {
        position: usize,
        expected: AssetId,
        found: AssetId,
    },
    #[error("weight for {asset} is negative ({weight})")]
    NegativeWeight { asset: AssetId, weight: f64 },
    #[error("weight for {asset} is not finite")]
    NonFiniteWeight { asset: AssetId },
    #[error("weights sum to {sum}, expected 1.0 within {tolerance}")]
    SumNotOne { sum: f64, tolerance: f64 },
}

/// Fatal errors raised by the simulation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("insufficient data: {available} observations available, at least {required} required")]
    InsufficientData { required: usize, available: usize },
    /// Covariance stayed non-positive-definite after the regularized retry
    #[error("covariance matrix is singular after regularization (assets: {})", join_assets(.assets))]
    SingularCovariance { assets: Vec<AssetId> },
    #[error(transparent)]
    WeightAlignment(#[from] WeightAlignmentError),
    #[error(transparent)]
    Data(#[from] DataError),
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

fn join_assets(assets: &[AssetId]) -> String {
    assets
        .iter()
        .map(AssetId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_covariance_lists_assets() {
        let err = SimulationError::SingularCovariance {
            assets: vec![AssetId::new("SPY"), AssetId::new("VOO")],
        };
        assert_eq!(
            err.to_string(),
            "covariance matrix is singular after regularization (assets: SPY, VOO)"
        );
    }

    #[test]
    fn test_weight_error_converts() {
        let err: SimulationError = WeightAlignmentError::SumNotOne {
            sum: 0.9,
            tolerance: 0.01,
        }
        .into();
        assert!(matches!(
            err,
            SimulationError::WeightAlignment(WeightAlignmentError::SumNotOne { .. })
        ));
        assert!(std::error::Error::source(&err).is_none());
    }
}
