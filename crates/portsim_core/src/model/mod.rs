mod ids;
mod results;
mod returns;
mod weights;

pub use ids::AssetId;
pub use results::{
    DrawdownStats, MonteCarloResult, PERCENTILE_TOLERANCE, PercentileBands, PortfolioPaths,
    ReturnPercentiles, RiskMetrics, SimulatedPaths, SimulationWarning, TailRisk, TargetFraming,
    TargetProbability, WarningKind,
};
pub use returns::HistoricalReturns;
pub use weights::{WEIGHT_SUM_TOLERANCE, WeightVector};
