//! Name-to-implementation mapping for the strategies.

use schoolbus_core::{ClusteringStrategy, StrategyKind};

use crate::ClusteringConfig;
use crate::strategies::{
    BalancedLoadStrategy, DensityStrategy, GridStrategy, KMeansStrategy, SweepStrategy,
};

/// Build the strategy selected by `kind`, tuned by `config`.
///
/// # Examples
///
/// ```
/// use schoolbus_cluster::{ClusteringConfig, strategy_for};
/// use schoolbus_core::StrategyKind;
///
/// let strategy = strategy_for(StrategyKind::Grid, &ClusteringConfig::default());
/// assert_eq!(strategy.kind(), StrategyKind::Grid);
/// ```
pub fn strategy_for(kind: StrategyKind, config: &ClusteringConfig) -> Box<dyn ClusteringStrategy> {
    match kind {
        StrategyKind::Sweep => Box::new(SweepStrategy),
        StrategyKind::BalancedLoad => Box::new(BalancedLoadStrategy::from_config(config)),
        StrategyKind::KMeans => Box::new(KMeansStrategy::from_config(config)),
        StrategyKind::Grid => Box::new(GridStrategy),
        StrategyKind::DensityNearestNeighbour => Box::new(DensityStrategy::from_config(config)),
    }
}
