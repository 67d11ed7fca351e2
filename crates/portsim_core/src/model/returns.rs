//! Historical daily return table
//!
//! The data provider hands over one column of daily fractional returns per
//! asset, aligned on a shared list of trading days. Everything downstream
//! indexes assets by column position, so the table validates its shape once
//! on construction and is immutable afterwards.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::model::AssetId;

/// Date-aligned daily returns, one column per asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ReturnsTable")]
pub struct HistoricalReturns {
    assets: Vec<AssetId>,
    dates: Vec<Date>,
    /// Returns matrix: columns[`asset_index`][`row`]
    columns: Vec<Vec<f64>>,
    #[serde(skip)]
    index: FxHashMap<AssetId, usize>,
}

/// Unvalidated wire form of `HistoricalReturns`
#[derive(Deserialize)]
struct ReturnsTable {
    assets: Vec<AssetId>,
    dates: Vec<Date>,
    columns: Vec<Vec<f64>>,
}

impl TryFrom<ReturnsTable> for HistoricalReturns {
    type Error = DataError;

    fn try_from(table: ReturnsTable) -> Result<Self, Self::Error> {
        if table.assets.len() != table.columns.len() {
            return Err(DataError::ColumnCountMismatch {
                assets: table.assets.len(),
                columns: table.columns.len(),
            });
        }
        Self::new(table.dates, table.assets.into_iter().zip(table.columns))
    }
}

impl HistoricalReturns {
    /// Build a table from `(asset, daily returns)` columns sharing `dates`.
    ///
    /// Fails if there are no columns, an asset id repeats, a column length
    /// differs from `dates`, dates are not strictly increasing, or any value is
    /// missing (NaN) or infinite.
    pub fn new<I, A>(dates: Vec<Date>, columns: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (A, Vec<f64>)>,
        A: Into<AssetId>,
    {
        if let Some(row) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DataError::UnorderedDates { row: row + 1 });
        }

        let mut assets = Vec::new();
        let mut data = Vec::new();
        let mut index = FxHashMap::default();

        for (asset, column) in columns {
            let asset = asset.into();
            if column.len() != dates.len() {
                return Err(DataError::RaggedColumn {
                    asset,
                    expected: dates.len(),
                    found: column.len(),
                });
            }
            if let Some(row) = column.iter().position(|r| !r.is_finite()) {
                return Err(DataError::NonFiniteReturn { asset, row });
            }
            if index.insert(asset.clone(), assets.len()).is_some() {
                return Err(DataError::DuplicateAsset(asset));
            }
            assets.push(asset);
            data.push(column);
        }

        if assets.is_empty() {
            return Err(DataError::NoAssets);
        }

        Ok(Self {
            assets,
            dates,
            columns: data,
            index,
        })
    }

    /// Asset identifiers in column order
    #[must_use]
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Number of observations (trading days)
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Daily returns of the asset at `asset_index`, oldest first
    #[must_use]
    pub fn column(&self, asset_index: usize) -> &[f64] {
        &self.columns[asset_index]
    }

    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Column position of an asset
    #[must_use]
    pub fn asset_index(&self, asset: &AssetId) -> Option<usize> {
        self.index.get(asset).copied()
    }

    /// The most recent `n` observations (all of them when fewer exist).
    #[must_use]
    pub fn window(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            assets: self.assets.clone(),
            dates: self.dates[start..].to_vec(),
            columns: self.columns.iter().map(|c| c[start..].to_vec()).collect(),
            index: self.index.clone(),
        }
    }
}
