//! Planning orchestrator for the school bus engine.
//!
//! [`FleetPlanner`] ties the pieces together: it screens the caller's input,
//! runs a clustering strategy from `schoolbus-cluster`, builds one waypoint
//! path per cluster and hands the paths to a
//! [`RouteOptimizer`](schoolbus_core::RouteOptimizer). Failures are kept as
//! local as possible. A student with bad coordinates is reported on its own,
//! and a cluster the optimizer could not route only unassigns that
//! cluster's students.
//!
//! Four entry points are offered:
//!
//! - [`FleetPlanner::plan_fleet`] clusters and routes a whole fleet.
//! - [`FleetPlanner::plan_with_clusters`] routes caller-supplied clusters.
//! - [`FleetPlanner::plan_single_cluster`] re-optimises one group.
//! - [`FleetPlanner::preview_clusters`] clusters without routing. The free
//!   function [`preview_clusters`] does the same without needing an
//!   optimizer at all.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod options;
mod planner;
mod roster;

pub use error::PlanError;
pub use options::{FleetRequest, PlanOptions, PlannerConfig};
pub use planner::{ClusterPreview, FleetPlanner, preview_clusters};
