//! Deterministic, in-process `RouteOptimizer` implementations used by unit
//! and behaviour tests across the workspace.

use std::collections::HashSet;

use crate::{
    LegSummary, OptimizeError, OptimizeRequest, OptimizedPath, RouteOptimizer, WaypointReorder,
    distance_meters,
};

/// Average bus speed assumed by [`StraightLineOptimizer`], in metres per
/// second (30 km/h).
pub const STRAIGHT_LINE_SPEED_MPS: f64 = 8.333_333_333_333_334;

/// Optimizer that keeps the submitted order and measures legs as
/// great-circle distances at [`STRAIGHT_LINE_SPEED_MPS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLineOptimizer;

impl StraightLineOptimizer {
    #[expect(clippy::float_arithmetic, reason = "leg duration is distance over speed")]
    fn legs(request: &OptimizeRequest) -> Vec<LegSummary> {
        request
            .path
            .waypoints()
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => {
                    let distance = distance_meters(from.position, to.position);
                    Some(LegSummary {
                        distance_meters: distance,
                        duration_seconds: distance / STRAIGHT_LINE_SPEED_MPS,
                    })
                }
                _ => None,
            })
            .collect()
    }
}

impl RouteOptimizer for StraightLineOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        if request.path.len() < 2 {
            return Err(OptimizeError::EmptyInput);
        }
        Ok(OptimizedPath {
            legs: Self::legs(request),
            reordering: Vec::new(),
        })
    }
}

/// Optimizer that reverses the middle of every path and reports unit legs.
///
/// Useful for checking that callers apply the reordering rather than the
/// submitted order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReversingOptimizer;

impl RouteOptimizer for ReversingOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        let len = request.path.len();
        if len < 2 {
            return Err(OptimizeError::EmptyInput);
        }
        let middle = request.path.middle().len();
        let reordering = (0..middle)
            .map(|original_index| WaypointReorder {
                original_index,
                optimized_index: middle - 1 - original_index,
            })
            .collect();
        Ok(OptimizedPath {
            legs: vec![
                LegSummary {
                    distance_meters: 1.0,
                    duration_seconds: 1.0,
                };
                len - 1
            ],
            reordering,
        })
    }
}

/// Optimizer that fails for selected buses (or all of them) and otherwise
/// behaves like [`StraightLineOptimizer`].
#[derive(Debug, Clone)]
pub struct FailingOptimizer {
    failing: Option<HashSet<String>>,
    error: OptimizeError,
}

impl FailingOptimizer {
    /// Fail every request with `error`.
    pub fn always(error: OptimizeError) -> Self {
        Self {
            failing: None,
            error,
        }
    }

    /// Fail only requests for the listed buses.
    pub fn for_buses<I, S>(bus_ids: I, error: OptimizeError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: Some(bus_ids.into_iter().map(Into::into).collect()),
            error,
        }
    }

    fn fails(&self, bus_id: &str) -> bool {
        self.failing
            .as_ref()
            .is_none_or(|failing| failing.contains(bus_id))
    }
}

impl Default for FailingOptimizer {
    fn default() -> Self {
        Self::always(OptimizeError::NetworkError {
            url: "http://routing.invalid".to_owned(),
            message: "connection refused".to_owned(),
        })
    }
}

impl RouteOptimizer for FailingOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        if self.fails(&request.bus_id) {
            return Err(self.error.clone());
        }
        StraightLineOptimizer.optimize(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bus, GeoPoint, RouteType, Student, WaypointPath, reconstruct_route};
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> OptimizeRequest {
        let school = GeoPoint::new(37.98, 23.73).expect("valid school");
        let students = vec![
            Student::new("far", 38.05, 23.80),
            Student::new("a", 37.99, 23.74),
            Student::new("b", 38.00, 23.75),
        ];
        OptimizeRequest::new(
            "b1",
            WaypointPath::build(school, &students, &[], RouteType::Pickup),
        )
    }

    #[rstest]
    fn straight_line_legs_match_waypoints(request: OptimizeRequest) {
        let answer = StraightLineOptimizer.optimize(&request).expect("answer");
        assert_eq!(answer.legs.len(), request.path.len() - 1);
        assert!(answer.legs.iter().all(|leg| leg.distance_meters > 0.0));
    }

    #[rstest]
    fn reversing_optimizer_reverses_middle(request: OptimizeRequest) {
        let answer = ReversingOptimizer.optimize(&request).expect("answer");
        let route = reconstruct_route(&Bus::new("b1", 3), &request.path, &answer).expect("route");
        assert_eq!(route.student_ids_ordered, ["far", "b", "a"]);
    }

    #[rstest]
    fn failing_optimizer_targets_listed_buses(request: OptimizeRequest) {
        let optimizer = FailingOptimizer::for_buses(["b2"], OptimizeError::EmptyInput);
        assert!(optimizer.optimize(&request).is_ok());
        let other = OptimizeRequest::new("b2", request.path.clone());
        assert_eq!(optimizer.optimize(&other), Err(OptimizeError::EmptyInput));
    }
}
