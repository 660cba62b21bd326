//! Property-based tests for the fleet planner.
//!
//! # Invariants tested
//!
//! - **Coverage:** every distinct student is either routed exactly once or
//!   listed once as unassigned.
//! - **Capacity:** no route carries more students than its bus seats.
//! - **Failure isolation:** a failing bus only loses its own students.
//! - **Pickup anchor:** without provider reordering, each pickup route starts
//!   with its furthest student.

mod proptest_support;

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use schoolbus_core::test_support::{FailingOptimizer, StraightLineOptimizer};
use schoolbus_core::{
    Bus, GeoPoint, OptimizeError, PlanResult, PlanStatus, Student, UnassignedReason,
    distance_meters,
};
use schoolbus_planner::{FleetPlanner, FleetRequest, PlanOptions};

use proptest_support::{
    SCHOOL_LAT, SCHOOL_LON, fleet_strategy, school, strategy_kind, student_set_strategy,
};

/// Assert that routed and unassigned ids partition the submitted ids.
fn assert_coverage(students: &[Student], result: &PlanResult) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for id in result
        .routed_student_ids()
        .into_iter()
        .chain(result.unassigned.iter().map(|entry| entry.student_id.as_str()))
    {
        prop_assert!(seen.insert(id.to_owned()), "student {id} reported twice");
    }
    let expected: HashSet<String> = students.iter().map(|student| student.id.clone()).collect();
    prop_assert_eq!(seen, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every student ends up in exactly one place.
    #[test]
    fn every_student_is_accounted_for(
        kind in strategy_kind(),
        students in student_set_strategy(0, 30),
        buses in fleet_strategy(4, 8),
        rebalance in any::<bool>(),
    ) {
        let request = FleetRequest::new(school(), students.clone(), buses);
        let options = PlanOptions::default()
            .with_strategy(kind)
            .with_rebalance(rebalance);

        let result = FleetPlanner::new(StraightLineOptimizer).plan_fleet(&request, &options);

        assert_coverage(&students, &result)?;
    }

    /// Property: routes never exceed their bus's seats.
    #[test]
    fn routes_respect_capacity(
        kind in strategy_kind(),
        students in student_set_strategy(1, 30),
        buses in fleet_strategy(4, 8),
    ) {
        let seats: HashMap<String, usize> =
            buses.iter().map(|bus| (bus.id.clone(), bus.seats())).collect();
        let request = FleetRequest::new(school(), students, buses);
        let options = PlanOptions::default().with_strategy(kind);

        let result = FleetPlanner::new(StraightLineOptimizer).plan_fleet(&request, &options);

        for route in &result.routes {
            let limit = seats.get(&route.bus_id).copied().unwrap_or_default();
            prop_assert!(
                route.student_ids_ordered.len() <= limit,
                "bus {} carries {} students but seats {}",
                route.bus_id,
                route.student_ids_ordered.len(),
                limit
            );
        }
    }

    /// Property: a failing bus never takes other buses' routes down with it.
    #[test]
    fn failures_stay_with_their_cluster(
        students in student_set_strategy(1, 24),
        buses in fleet_strategy(4, 8),
        failing_index in 0_usize..4,
    ) {
        let failing_bus = format!("b{failing_index}");
        let optimizer =
            FailingOptimizer::for_buses([failing_bus.clone()], OptimizeError::EmptyInput);
        let request = FleetRequest::new(school(), students.clone(), buses);

        let result = FleetPlanner::new(optimizer).plan_fleet(&request, &PlanOptions::default());

        assert_coverage(&students, &result)?;
        prop_assert!(result.routes.iter().all(|route| route.bus_id != failing_bus));
        for failure in &result.failures {
            prop_assert_eq!(&failure.bus_id, &failing_bus);
        }
        if result.failures.is_empty() {
            prop_assert_ne!(result.status, PlanStatus::PartialFailure);
        } else {
            prop_assert_eq!(result.status, PlanStatus::PartialFailure);
            prop_assert!(result
                .unassigned
                .iter()
                .any(|entry| entry.reason == UnassignedReason::OptimizationFailed));
        }
    }

    /// Property: pickup routes start at their furthest student.
    #[test]
    fn pickup_routes_start_furthest_from_school(
        kind in strategy_kind(),
        students in student_set_strategy(1, 20),
        buses in fleet_strategy(3, 8),
    ) {
        let request = FleetRequest::new(school(), students.clone(), buses);
        let options = PlanOptions::default().with_strategy(kind);
        let origin = GeoPoint::new(SCHOOL_LAT, SCHOOL_LON)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let by_id: HashMap<&str, &Student> =
            students.iter().map(|student| (student.id.as_str(), student)).collect();
        let reach = |id: &str| -> f64 {
            by_id
                .get(id)
                .and_then(|student| GeoPoint::from_parts(student.lat, student.lon).ok())
                .map_or(0.0, |position| distance_meters(origin, position))
        };

        let result = FleetPlanner::new(StraightLineOptimizer).plan_fleet(&request, &options);

        for route in &result.routes {
            let Some(first) = route.student_ids_ordered.first() else {
                continue;
            };
            let furthest = route
                .student_ids_ordered
                .iter()
                .map(|id| reach(id))
                .fold(0.0_f64, f64::max);
            prop_assert!(
                reach(first) >= furthest,
                "route for {} starts with {} which is not the furthest student",
                route.bus_id,
                first
            );
        }
    }
}

/// Buses carry nothing once the school is unusable.
#[test]
fn invalid_school_routes_nobody() {
    let students = vec![Student::new("s0", 37.99, 23.74)];
    let request = FleetRequest::new(
        schoolbus_core::Point::default(),
        students.clone(),
        vec![Bus::new("b0", 4)],
    );

    let result =
        FleetPlanner::new(StraightLineOptimizer).plan_fleet(&request, &PlanOptions::default());

    assert!(matches!(result.status, PlanStatus::Rejected { .. }));
    assert!(result.routes.is_empty());
    assert_eq!(result.unassigned.len(), students.len());
}
