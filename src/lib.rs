//! Facade crate for the school bus assignment and routing engine.
//!
//! This crate re-exports the core domain types, the clustering strategies and
//! the planner, and exposes the HTTP routing client behind a feature flag.

#![forbid(unsafe_code)]

pub use schoolbus_core::{
    Bus, Cluster, ClusterFailure, Clustering, ClusteringStrategy, CoordinateError, GeoPoint,
    Located, OptimizeError, OptimizeRequest, OptimizedPath, PlanResult, PlanStatus, Point,
    RejectReason, Route, RouteOptimizer, RouteSegment, RouteType, Stop, StrategyKind, Student,
    UnassignedReason, UnassignedStudent, Waypoint, WaypointPath,
};

pub use schoolbus_cluster::{ClusteringConfig, balance_clusters, rebalance_adjacent, strategy_for};

pub use schoolbus_planner::{
    ClusterPreview, FleetPlanner, FleetRequest, PlanError, PlanOptions, PlannerConfig,
    preview_clusters,
};

#[cfg(feature = "http-optimizer")]
pub use schoolbus_routing::{HttpRouteOptimizer, HttpRouteOptimizerConfig, ProviderBuildError};

#[cfg(feature = "test-support")]
pub use schoolbus_core::test_support;
