//! Clustering strategies for the school bus planning engine.
//!
//! Each strategy implements [`ClusteringStrategy`](schoolbus_core::ClusteringStrategy)
//! and partitions students into one capacity-bounded group per bus. Use
//! [`strategy_for`] to pick one by [`StrategyKind`](schoolbus_core::StrategyKind),
//! or construct a strategy directly when its tunables need to differ from
//! [`ClusteringConfig::default`].
//!
//! Strategies never fail. Students with unusable coordinates and students no
//! bus had room for are returned in
//! [`Clustering::unassigned`](schoolbus_core::Clustering::unassigned).

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod arena;
mod balancer;
mod config;
mod registry;
mod strategies;

pub use balancer::{balance_clusters, rebalance_adjacent};
pub use config::ClusteringConfig;
pub use registry::strategy_for;
pub use strategies::{
    BalancedLoadStrategy, DensityStrategy, GridStrategy, KMeansStrategy, SweepStrategy,
};
