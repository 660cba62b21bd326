//! Aggregated result of a fleet planning call.

use thiserror::Error;

use crate::Route;

/// Why a planning call was refused before any algorithm ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    /// The school had missing or unusable coordinates.
    #[error("school coordinates are missing or invalid")]
    InvalidSchool,
    /// No buses were supplied.
    #[error("no buses were supplied")]
    NoBuses,
    /// Buses were supplied but none has a positive capacity.
    #[error("no bus has a positive capacity")]
    NoActiveBuses,
    /// No student had usable coordinates.
    #[error("no student has valid coordinates")]
    NoValidStudents,
}

/// Terminal state of a planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum PlanStatus {
    /// Every non-empty cluster was optimised.
    Success,
    /// At least one cluster failed optimisation; the rest succeeded.
    PartialFailure,
    /// The request was refused; no routes were produced.
    Rejected {
        /// Why the request was refused.
        reason: RejectReason,
    },
}

/// Why a student is not on any route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnassignedReason {
    /// Coordinates were missing, the `0,0` sentinel, or out of range.
    InvalidCoordinates,
    /// The fleet had no seat left for the student.
    CapacityExceeded,
    /// The student's cluster could not be optimised.
    OptimizationFailed,
    /// The whole request was rejected.
    PlanRejected,
}

/// A student left off every route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnassignedStudent {
    /// The student.
    pub student_id: String,
    /// Why the student was left off.
    pub reason: UnassignedReason,
}

impl UnassignedStudent {
    /// Construct an entry.
    pub fn new(student_id: impl Into<String>, reason: UnassignedReason) -> Self {
        Self {
            student_id: student_id.into(),
            reason,
        }
    }
}

/// A cluster whose optimisation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClusterFailure {
    /// Bus whose cluster failed.
    pub bus_id: String,
    /// Human-readable failure description, for logs.
    pub reason: String,
}

/// Routes plus per-student bookkeeping for one planning call.
///
/// Every input student id appears exactly once across
/// `routes[].student_ids_ordered` and `unassigned`.
///
/// # Examples
/// ```
/// use schoolbus_core::{PlanResult, PlanStatus, RejectReason};
///
/// let result = PlanResult::rejected(RejectReason::NoBuses, ["s1", "s2"]);
/// assert_eq!(result.status, PlanStatus::Rejected { reason: RejectReason::NoBuses });
/// assert_eq!(result.unassigned_student_ids(), ["s1", "s2"]);
/// assert!(result.routes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlanResult {
    /// Terminal state.
    pub status: PlanStatus,
    /// One route per successfully optimised cluster.
    pub routes: Vec<Route>,
    /// Students not on any route, with reasons.
    pub unassigned: Vec<UnassignedStudent>,
    /// Clusters that failed optimisation.
    pub failures: Vec<ClusterFailure>,
}

impl PlanResult {
    /// A rejected result listing every supplied student as unassigned.
    pub fn rejected<I, S>(reason: RejectReason, student_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: PlanStatus::Rejected { reason },
            routes: Vec::new(),
            unassigned: student_ids
                .into_iter()
                .map(|id| UnassignedStudent::new(id, UnassignedReason::PlanRejected))
                .collect(),
            failures: Vec::new(),
        }
    }

    /// Identifiers of every unassigned student, whatever the reason.
    pub fn unassigned_student_ids(&self) -> Vec<&str> {
        self.unassigned
            .iter()
            .map(|entry| entry.student_id.as_str())
            .collect()
    }

    /// Identifiers of students excluded for bad coordinates.
    pub fn invalid_student_ids(&self) -> Vec<&str> {
        self.unassigned
            .iter()
            .filter(|entry| entry.reason == UnassignedReason::InvalidCoordinates)
            .map(|entry| entry.student_id.as_str())
            .collect()
    }

    /// Identifiers of students on some route, in route order.
    pub fn routed_student_ids(&self) -> Vec<&str> {
        self.routes
            .iter()
            .flat_map(|route| route.student_ids_ordered.iter().map(String::as_str))
            .collect()
    }
}
