//! Order waypoints through an external routing service and rebuild routes.
//!
//! The [`RouteOptimizer`] trait abstracts the provider. Callers submit an
//! [`OptimizeRequest`] per cluster and receive per-leg measurements plus an
//! optional reordering of the middle waypoints, which
//! [`reconstruct_route`] turns into a [`Route`](crate::Route).

mod error;
mod provider;
mod reconstruct;

pub use error::OptimizeError;
pub use provider::{
    LegSummary, OptimizeOptions, OptimizeRequest, OptimizedPath, RouteOptimizer, WaypointReorder,
};
pub use reconstruct::reconstruct_route;
