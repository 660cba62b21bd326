//! Tests for the `FleetPlanner`.

use super::*;
use rstest::{fixture, rstest};
use schoolbus_core::test_support::{FailingOptimizer, ReversingOptimizer, StraightLineOptimizer};
use schoolbus_routing::test_support::StubRouteOptimizer;

#[fixture]
fn school() -> Point {
    Point::new("school", 37.98, 23.73)
}

/// `count` students fanned out north-east of the school, further away as
/// the index grows.
fn students(prefix: &str, count: u32) -> Vec<Student> {
    (0..count)
        .map(|i| {
            let reach = 0.005 + f64::from(i) * 0.002;
            Student::new(format!("{prefix}{i}"), 37.98 + reach, 23.73 + reach * 0.5)
        })
        .collect()
}

fn sorted(ids: Vec<&str>) -> Vec<String> {
    let mut owned: Vec<String> = ids.into_iter().map(str::to_owned).collect();
    owned.sort();
    owned
}

fn reasons(result: &PlanResult, reason: UnassignedReason) -> Vec<&str> {
    result
        .unassigned
        .iter()
        .filter(|entry| entry.reason == reason)
        .map(|entry| entry.student_id.as_str())
        .collect()
}

#[rstest]
fn plans_every_student_when_seats_suffice(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let request = FleetRequest::new(
        school,
        students("s", 7),
        vec![Bus::new("b1", 4).with_name("North"), Bus::new("b2", 3)],
    );

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(result.status, PlanStatus::Success);
    assert!(result.unassigned.is_empty());
    assert_eq!(result.routed_student_ids().len(), 7);
    let north = result
        .routes
        .iter()
        .find(|route| route.bus_id == "b1")
        .expect("b1 should have a route");
    assert_eq!(north.bus_name, "North");
    assert!(north.student_ids_ordered.len() <= 4);
}

#[rstest]
#[case(StrategyKind::Sweep)]
#[case(StrategyKind::BalancedLoad)]
#[case(StrategyKind::KMeans)]
#[case(StrategyKind::Grid)]
#[case(StrategyKind::DensityNearestNeighbour)]
fn overflow_is_reported_as_capacity_exceeded(school: Point, #[case] strategy: StrategyKind) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let request = FleetRequest::new(school, students("s", 10), vec![Bus::new("b1", 6)]);

    let result = planner.plan_fleet(&request, &PlanOptions::default().with_strategy(strategy));

    assert_eq!(result.status, PlanStatus::Success);
    assert_eq!(result.routed_student_ids().len(), 6);
    assert_eq!(reasons(&result, UnassignedReason::CapacityExceeded).len(), 4);
}

#[rstest]
fn pickup_routes_start_at_the_furthest_student(school: Point) {
    let planner = FleetPlanner::new(ReversingOptimizer);
    let request = FleetRequest::new(school, students("s", 4), vec![Bus::new("b1", 4)]);

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    let route = result.routes.first().expect("one route");
    assert_eq!(route.student_ids_ordered.first().map(String::as_str), Some("s3"));
    assert_eq!(
        route.waypoints.last().map(|waypoint| waypoint.kind),
        Some(WaypointKind::School)
    );
}

#[rstest]
fn invalid_students_are_reported_separately(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let mut roster = students("s", 3);
    roster.push(Student::new("polar", 91.0, 23.73));
    roster.push(Student::without_location("lost"));
    let request = FleetRequest::new(school, roster, vec![Bus::new("b1", 10)]);

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(result.invalid_student_ids(), ["polar", "lost"]);
    assert!(!result.routed_student_ids().contains(&"polar"));
    assert_eq!(result.routed_student_ids().len(), 3);
}

#[rstest]
fn duplicate_ids_are_planned_once(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let mut roster = students("s", 2);
    roster.push(Student::new("s0", 38.1, 23.9));
    let request = FleetRequest::new(school, roster, vec![Bus::new("b1", 5)]);

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(sorted(result.routed_student_ids()), ["s0", "s1"]);
    assert!(result.unassigned.is_empty());
}

#[rstest]
#[case(Point::new("school", 0.0, 0.0), vec![Bus::new("b1", 3)], RejectReason::InvalidSchool)]
#[case(Point::new("school", 37.98, 23.73), Vec::new(), RejectReason::NoBuses)]
#[case(Point::new("school", 37.98, 23.73), vec![Bus::new("b1", 0)], RejectReason::NoActiveBuses)]
fn refused_requests_account_for_every_student(
    #[case] school: Point,
    #[case] buses: Vec<Bus>,
    #[case] reason: RejectReason,
) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let request = FleetRequest::new(school, students("s", 3), buses);

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(result.status, PlanStatus::Rejected { reason });
    assert!(result.routes.is_empty());
    assert_eq!(reasons(&result, UnassignedReason::PlanRejected), ["s0", "s1", "s2"]);
}

#[rstest]
fn no_valid_students_is_rejected(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let request = FleetRequest::new(
        school,
        vec![Student::without_location("a"), Student::new("b", 0.0, 0.0)],
        vec![Bus::new("b1", 3)],
    );

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(
        result.status,
        PlanStatus::Rejected {
            reason: RejectReason::NoValidStudents
        }
    );
    assert_eq!(result.invalid_student_ids(), ["a", "b"]);
}

#[rstest]
fn zero_capacity_buses_are_skipped(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let request = FleetRequest::new(
        school,
        students("s", 3),
        vec![Bus::new("idle", 0), Bus::new("b1", 3)],
    );

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(result.status, PlanStatus::Success);
    assert!(result.routes.iter().all(|route| route.bus_id == "b1"));
}

#[rstest]
fn failed_cluster_leaves_others_intact(school: Point) {
    let planner = FleetPlanner::new(FailingOptimizer::for_buses(
        ["b2"],
        OptimizeError::Timeout {
            url: "http://routing.invalid".to_owned(),
            timeout_secs: 120,
        },
    ));
    let request = FleetRequest::new(
        school,
        students("s", 6),
        vec![Bus::new("b1", 3), Bus::new("b2", 3)],
    );

    let result = planner.plan_fleet(&request, &PlanOptions::default());

    assert_eq!(result.status, PlanStatus::PartialFailure);
    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].bus_id, "b1");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].bus_id, "b2");
    let failed = reasons(&result, UnassignedReason::OptimizationFailed);
    assert_eq!(failed.len(), 3);
    let mut covered = result.routed_student_ids();
    covered.extend(failed);
    assert_eq!(sorted(covered), ["s0", "s1", "s2", "s3", "s4", "s5"]);
}

#[rstest]
#[case(true, 1)]
#[case(false, 0)]
fn transport_follows_the_batch_option(
    school: Point,
    #[case] use_batch: bool,
    #[case] batch_calls: usize,
) {
    let planner = FleetPlanner::new(StubRouteOptimizer::new());
    let request = FleetRequest::new(
        school,
        students("s", 4),
        vec![Bus::new("b1", 2), Bus::new("b2", 2)],
    );

    let result = planner.plan_fleet(&request, &PlanOptions::default().with_batch(use_batch));

    assert_eq!(result.status, PlanStatus::Success);
    assert_eq!(planner.optimizer().batch_calls(), batch_calls);
    assert_eq!(planner.optimizer().requested_buses(), ["b1", "b2"]);
}

#[rstest]
fn given_clusters_are_truncated_and_screened(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let mut crowded = students("a", 3);
    crowded.push(Student::without_location("lost"));
    let clusters = vec![
        Cluster {
            bus_id: "b1".to_owned(),
            capacity: 2,
            students: crowded,
        },
        Cluster {
            bus_id: "b2".to_owned(),
            capacity: 2,
            students: Vec::new(),
        },
    ];

    let result = planner.plan_with_clusters(&school, &clusters, &[], &PlanOptions::default());

    assert_eq!(result.status, PlanStatus::Success);
    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].student_ids_ordered.len(), 2);
    assert_eq!(reasons(&result, UnassignedReason::CapacityExceeded), ["a2"]);
    assert_eq!(result.invalid_student_ids(), ["lost"]);
}

#[rstest]
fn given_clusters_keep_their_grouping(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let clusters = vec![
        Cluster {
            bus_id: "b1".to_owned(),
            capacity: 3,
            students: students("a", 2),
        },
        Cluster {
            bus_id: "b2".to_owned(),
            capacity: 3,
            students: students("b", 3),
        },
    ];

    let result = planner.plan_with_clusters(&school, &clusters, &[], &PlanOptions::default());

    let first: Vec<&str> = result.routes[0]
        .student_ids_ordered
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(sorted(first), ["a0", "a1"]);
    assert_eq!(result.routes[1].student_ids_ordered.len(), 3);
}

#[rstest]
fn single_cluster_applies_the_provider_order(school: Point) {
    let planner = FleetPlanner::new(ReversingOptimizer);
    let cluster = Cluster {
        bus_id: "b1".to_owned(),
        capacity: 4,
        students: students("s", 4),
    };
    let stops = [Stop::new("gate", 37.981, 23.731)];

    let route = planner
        .plan_single_cluster(&school, &cluster, &stops, &PlanOptions::default())
        .expect("route should be planned");

    // Submitted: s3 | s0 s1 s2 gate | school. The middle comes back reversed.
    assert_eq!(route.student_ids_ordered, ["s3", "s2", "s1", "s0"]);
    assert_eq!(route.stops_ordered, ["gate"]);
    assert_eq!(route.waypoints[1].id, "gate");
}

#[rstest]
fn single_cluster_without_routable_students_fails(school: Point) {
    let planner = FleetPlanner::new(StraightLineOptimizer);
    let cluster = Cluster {
        bus_id: "b1".to_owned(),
        capacity: 4,
        students: vec![Student::without_location("lost")],
    };

    let err = planner
        .plan_single_cluster(&school, &cluster, &[], &PlanOptions::default())
        .expect_err("should fail");

    assert_eq!(
        err,
        PlanError::EmptyCluster {
            bus_id: "b1".to_owned()
        }
    );
}

#[rstest]
fn single_cluster_surfaces_optimizer_errors(school: Point) {
    let planner = FleetPlanner::new(FailingOptimizer::default());
    let cluster = Cluster {
        bus_id: "b1".to_owned(),
        capacity: 4,
        students: students("s", 2),
    };

    let err = planner
        .plan_single_cluster(&school, &cluster, &[], &PlanOptions::default())
        .expect_err("should fail");

    assert!(matches!(err, PlanError::Optimize { ref bus_id, .. } if bus_id == "b1"));
}

#[rstest]
fn preview_never_contacts_the_provider(school: Point) {
    let planner = FleetPlanner::new(StubRouteOptimizer::new());

    let preview = planner
        .preview_clusters(
            &school,
            &students("s", 5),
            &[Bus::new("b1", 2), Bus::new("b2", 2)],
            StrategyKind::Sweep,
        )
        .expect("preview should succeed");

    assert_eq!(preview.clustering.clusters.len(), 2);
    assert_eq!(preview.clustering.assigned_count(), 4);
    assert_eq!(preview.clustering.unassigned.len(), 1);
    assert!(preview.invalid_student_ids.is_empty());
    assert!(planner.optimizer().requested_buses().is_empty());
}

#[rstest]
fn preview_reports_students_with_bad_coordinates(school: Point) {
    let students = [
        Student::new("ok", 37.99, 23.74),
        Student::new("polar", 91.0, 23.74),
        Student::without_location("nowhere"),
    ];

    let preview = preview_clusters(
        &PlannerConfig::default(),
        &school,
        &students,
        &[Bus::new("b1", 4)],
        StrategyKind::Sweep,
    )
    .expect("preview should succeed");

    let placed: Vec<&str> = preview
        .clustering
        .clusters
        .iter()
        .flat_map(Cluster::student_ids)
        .collect();
    assert_eq!(placed, ["ok"]);
    assert!(preview.clustering.unassigned.is_empty());
    assert_eq!(preview.invalid_student_ids, ["polar", "nowhere"]);
}

#[rstest]
fn preview_rejects_an_unusable_school() {
    let planner = FleetPlanner::new(StraightLineOptimizer);

    let err = planner
        .preview_clusters(
            &Point::default(),
            &students("s", 2),
            &[Bus::new("b1", 2)],
            StrategyKind::Grid,
        )
        .expect_err("should fail");

    assert_eq!(
        err,
        PlanError::InvalidInput {
            reason: RejectReason::InvalidSchool
        }
    );
}

#[rstest]
fn centers_fall_back_to_the_school_for_empty_clusters() {
    let school = GeoPoint::new(37.98, 23.73).expect("valid school");
    let clusters = [
        Cluster {
            bus_id: "b1".to_owned(),
            capacity: 2,
            students: vec![Student::new("a", 38.0, 23.0), Student::new("b", 38.2, 23.2)],
        },
        Cluster {
            bus_id: "b2".to_owned(),
            capacity: 2,
            students: Vec::new(),
        },
    ];

    let centers = cluster_centers(school, &clusters);

    assert!((centers[0].x - 23.1).abs() < 1e-9);
    assert!((centers[0].y - 38.1).abs() < 1e-9);
    assert_eq!(centers[1], school.coord());
}
