//! Core domain types for the school bus planning engine.
//!
//! This crate holds the validated geometry primitives, the caller-facing
//! input and output models, the waypoint path builder and the optimizer
//! reconstruction step. Algorithms that partition students live behind the
//! [`ClusteringStrategy`] trait and routing services behind
//! [`RouteOptimizer`], both implemented in sibling crates.

mod cluster;
mod geodesy;
mod model;
pub mod optimizer;
mod plan;
mod route;
mod waypoint;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cluster::{Cluster, Clustering, ClusteringStrategy, StrategyKind};
pub use geodesy::{
    CoordinateError, EARTH_RADIUS_METERS, GeoPoint, bearing_degrees, distance_meters,
    is_valid_point,
};
pub use model::{Bus, Located, Point, Stop, Student, sort_stops};
pub use optimizer::{
    LegSummary, OptimizeError, OptimizeOptions, OptimizeRequest, OptimizedPath, RouteOptimizer,
    WaypointReorder, reconstruct_route,
};
pub use plan::{
    ClusterFailure, PlanResult, PlanStatus, RejectReason, UnassignedReason, UnassignedStudent,
};
pub use route::{Route, RouteSegment};
pub use waypoint::{RouteType, SCHOOL_WAYPOINT_ID, Waypoint, WaypointKind, WaypointPath};
