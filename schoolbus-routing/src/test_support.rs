//! Test utilities for route optimizers.
//!
//! This module provides [`StubRouteOptimizer`], a scripted test double for
//! [`RouteOptimizer`] that answers from a queue of canned responses without
//! making HTTP requests, and records which transport each call used.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use schoolbus_core::{
    LegSummary, OptimizeError, OptimizeRequest, OptimizedPath, RouteOptimizer,
};

/// Scripted `RouteOptimizer` for testing.
///
/// Responses are consumed in call order. Once the script is exhausted the
/// stub answers every request with unit legs and no reordering.
///
/// # Example
///
/// ```
/// use schoolbus_core::{
///     GeoPoint, OptimizeError, OptimizeRequest, RouteOptimizer, RouteType, Student, WaypointPath,
/// };
/// use schoolbus_routing::test_support::StubRouteOptimizer;
///
/// let stub = StubRouteOptimizer::new().then_fail(OptimizeError::EmptyInput);
/// let school = GeoPoint::new(37.98, 23.73)?;
/// let students = [Student::new("s1", 38.0, 23.7)];
/// let path = WaypointPath::build(school, &students, &[], RouteType::Pickup);
/// let request = OptimizeRequest::new("b1", path);
///
/// assert!(stub.optimize(&request).is_err());
/// assert!(stub.optimize(&request).is_ok());
/// assert_eq!(stub.requested_buses(), ["b1", "b1"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct StubRouteOptimizer {
    script: Mutex<VecDeque<Result<OptimizedPath, OptimizeError>>>,
    requested: Mutex<Vec<String>>,
    batch_calls: Mutex<usize>,
}

/// Lock `mutex`, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Unit legs for every consecutive waypoint pair, no reordering.
fn unit_answer(request: &OptimizeRequest) -> OptimizedPath {
    OptimizedPath {
        legs: vec![
            LegSummary {
                distance_meters: 1.0,
                duration_seconds: 1.0,
            };
            request.path.len().saturating_sub(1)
        ],
        reordering: Vec::new(),
    }
}

impl StubRouteOptimizer {
    /// Create a stub with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer.
    #[must_use]
    pub fn then_answer(self, answer: OptimizedPath) -> Self {
        lock(&self.script).push_back(Ok(answer));
        self
    }

    /// Queue a failure.
    #[must_use]
    pub fn then_fail(self, error: OptimizeError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Bus ids of every request seen, in call order.
    #[must_use]
    pub fn requested_buses(&self) -> Vec<String> {
        lock(&self.requested).clone()
    }

    /// Number of [`RouteOptimizer::optimize_batch`] calls received.
    #[must_use]
    pub fn batch_calls(&self) -> usize {
        *lock(&self.batch_calls)
    }
}

impl RouteOptimizer for StubRouteOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        lock(&self.requested).push(request.bus_id.clone());
        if request.path.len() < 2 {
            return Err(OptimizeError::EmptyInput);
        }
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(unit_answer(request)))
    }

    fn optimize_batch(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        *lock(&self.batch_calls) += 1;
        self.optimize_all(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use schoolbus_core::{GeoPoint, RouteType, Student, WaypointPath};

    #[fixture]
    fn request() -> OptimizeRequest {
        let school = GeoPoint::new(37.98, 23.73).expect("valid school");
        let students = [Student::new("s1", 38.0, 23.7), Student::new("s2", 37.99, 23.72)];
        OptimizeRequest::new(
            "b1",
            WaypointPath::build(school, &students, &[], RouteType::Pickup),
        )
    }

    #[rstest]
    fn exhausted_script_answers_with_unit_legs(request: OptimizeRequest) {
        let answer = StubRouteOptimizer::new()
            .optimize(&request)
            .expect("should succeed");

        assert_eq!(answer.legs.len(), 2);
        assert!(answer.reordering.is_empty());
    }

    #[rstest]
    fn script_is_consumed_in_order(request: OptimizeRequest) {
        let scripted = OptimizedPath {
            legs: vec![LegSummary::default(); 2],
            reordering: Vec::new(),
        };
        let stub = StubRouteOptimizer::new()
            .then_answer(scripted.clone())
            .then_fail(OptimizeError::EmptyInput);

        assert_eq!(stub.optimize(&request), Ok(scripted));
        assert_eq!(stub.optimize(&request), Err(OptimizeError::EmptyInput));
        assert!(stub.optimize(&request).is_ok());
    }

    #[rstest]
    fn batch_calls_are_counted(request: OptimizeRequest) {
        let stub = StubRouteOptimizer::new();
        let results = stub.optimize_batch(&[request.clone(), request]);

        assert_eq!(results.len(), 2);
        assert_eq!(stub.batch_calls(), 1);
        assert_eq!(stub.requested_buses(), ["b1", "b1"]);
    }
}
