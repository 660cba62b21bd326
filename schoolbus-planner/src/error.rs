//! Errors for the single-value planning operations.

use schoolbus_core::{OptimizeError, RejectReason};
use thiserror::Error;

/// Why [`plan_single_cluster`](crate::FleetPlanner::plan_single_cluster) or
/// [`preview_clusters`](crate::FleetPlanner::preview_clusters) produced no
/// value.
///
/// Fleet planning never fails this way; it reports the same conditions
/// through [`PlanResult::status`](schoolbus_core::PlanResult::status).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The request was refused before any algorithm ran.
    #[error("invalid planning input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: RejectReason,
    },
    /// The cluster has no student with usable coordinates.
    #[error("cluster for bus {bus_id} has no routable students")]
    EmptyCluster {
        /// Bus the cluster belongs to.
        bus_id: String,
    },
    /// The routing service failed or answered inconsistently.
    #[error("optimising the route for bus {bus_id} failed: {source}")]
    Optimize {
        /// Bus the cluster belongs to.
        bus_id: String,
        /// Underlying optimizer error.
        #[source]
        source: OptimizeError,
    },
}

impl From<RejectReason> for PlanError {
    fn from(reason: RejectReason) -> Self {
        Self::InvalidInput { reason }
    }
}
