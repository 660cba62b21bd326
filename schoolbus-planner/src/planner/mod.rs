//! `FleetPlanner`: validate, cluster, optimise, aggregate.

use std::collections::HashSet;

use geo::{Centroid, Coord, MultiPoint};
use log::{debug, info, warn};
use schoolbus_cluster::{balance_clusters, strategy_for};
use schoolbus_core::{
    Bus, Cluster, ClusterFailure, Clustering, ClusteringStrategy, GeoPoint, Located,
    OptimizeError, OptimizeRequest, PlanResult, PlanStatus, Point, RejectReason, Route,
    RouteOptimizer, Stop, StrategyKind, Student, UnassignedReason, UnassignedStudent,
    WaypointKind, WaypointPath, reconstruct_route,
};

use crate::roster::{Roster, active_buses, report_unusable_stops};
use crate::{FleetRequest, PlanError, PlanOptions, PlannerConfig};

/// Plans bus routes for a school.
///
/// The planner is generic over the routing service so that tests and
/// offline tools can substitute a deterministic optimizer. Every call is
/// independent; the planner holds no state between calls.
///
/// # Examples
///
/// ```
/// use schoolbus_core::test_support::StraightLineOptimizer;
/// use schoolbus_core::{Bus, PlanStatus, Point, Student};
/// use schoolbus_planner::{FleetPlanner, FleetRequest, PlanOptions};
///
/// let planner = FleetPlanner::new(StraightLineOptimizer);
/// let request = FleetRequest::new(
///     Point::new("school", 37.98, 23.73),
///     vec![Student::new("s1", 37.99, 23.74), Student::new("s2", 38.00, 23.75)],
///     vec![Bus::new("b1", 4)],
/// );
///
/// let result = planner.plan_fleet(&request, &PlanOptions::default());
/// assert_eq!(result.status, PlanStatus::Success);
/// assert_eq!(result.routes[0].student_ids_ordered, ["s2", "s1"]);
/// ```
#[derive(Debug)]
pub struct FleetPlanner<O: RouteOptimizer> {
    optimizer: O,
    config: PlannerConfig,
}

impl<O: RouteOptimizer> FleetPlanner<O> {
    /// Construct a planner using default configuration.
    #[must_use]
    pub fn new(optimizer: O) -> Self {
        Self::with_config(optimizer, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    #[must_use]
    pub const fn with_config(optimizer: O, config: PlannerConfig) -> Self {
        Self { optimizer, config }
    }

    /// The routing service in use.
    #[must_use]
    pub const fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Give back the routing service.
    #[must_use]
    pub fn into_optimizer(self) -> O {
        self.optimizer
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Cluster the students with the selected strategy and optimise one
    /// route per non-empty cluster.
    ///
    /// Never fails: refused requests come back with
    /// [`PlanStatus::Rejected`] and clusters the optimizer could not route
    /// turn the status into [`PlanStatus::PartialFailure`]. Every distinct
    /// student id appears exactly once across the routes and the
    /// unassigned list.
    #[must_use]
    pub fn plan_fleet(&self, request: &FleetRequest, options: &PlanOptions) -> PlanResult {
        let roster = Roster::screen(&request.students);
        let Ok(school) = request.school.position() else {
            return reject(RejectReason::InvalidSchool, &roster);
        };
        if request.buses.is_empty() {
            return reject(RejectReason::NoBuses, &roster);
        }
        let buses = active_buses(&request.buses);
        if buses.is_empty() {
            return reject(RejectReason::NoActiveBuses, &roster);
        }
        if roster.valid.is_empty() {
            return reject(RejectReason::NoValidStudents, &roster);
        }
        report_unusable_stops(&request.stops);

        let strategy = strategy_for(options.strategy, &self.config.clustering);
        let mut clustering = strategy.cluster(school, &roster.valid, &buses);
        let mut unassigned = roster.invalid_entries();
        unassigned.extend(
            clustering
                .unassigned
                .drain(..)
                .map(|id| UnassignedStudent::new(id, UnassignedReason::CapacityExceeded)),
        );
        if options.rebalance {
            let centers = cluster_centers(school, &clustering.clusters);
            balance_clusters(
                &mut clustering.clusters,
                &centers,
                self.config.clustering.balancer_radius_meters,
            );
        }

        let fleet = clustering
            .clusters
            .into_iter()
            .map(|cluster| {
                let bus = buses
                    .iter()
                    .find(|bus| bus.id == cluster.bus_id)
                    .cloned()
                    .unwrap_or_else(|| Bus::new(cluster.bus_id.clone(), cluster.capacity));
                (bus, cluster)
            })
            .collect();
        self.route_clusters(school, fleet, &request.stops, options, unassigned)
    }

    /// Optimise caller-supplied clusters without running a strategy.
    ///
    /// Used when an operator has arranged the groups by hand. Students are
    /// screened the same way as in [`plan_fleet`](Self::plan_fleet):
    /// duplicates after the first occurrence are dropped, unusable
    /// coordinates are reported, and any cluster above its capacity is
    /// truncated with the overflow reported as
    /// [`UnassignedReason::CapacityExceeded`]. The balancer never runs in
    /// this mode.
    #[must_use]
    pub fn plan_with_clusters(
        &self,
        school: &Point,
        clusters: &[Cluster],
        stops: &[Stop],
        options: &PlanOptions,
    ) -> PlanResult {
        let roster = Roster::screen(clusters.iter().flat_map(|cluster| &cluster.students));
        let Ok(origin) = school.position() else {
            return reject(RejectReason::InvalidSchool, &roster);
        };
        if clusters.is_empty() {
            return reject(RejectReason::NoBuses, &roster);
        }
        if clusters.iter().all(|cluster| cluster.capacity == 0) {
            return reject(RejectReason::NoActiveBuses, &roster);
        }
        if roster.valid.is_empty() {
            return reject(RejectReason::NoValidStudents, &roster);
        }
        report_unusable_stops(stops);

        let mut seen = HashSet::new();
        let fleet = clusters
            .iter()
            .map(|cluster| {
                let students = cluster
                    .students
                    .iter()
                    .filter(|student| seen.insert(student.id.as_str()))
                    .filter(|student| student.position().is_ok())
                    .cloned()
                    .collect();
                let bus = Bus::new(cluster.bus_id.clone(), cluster.capacity);
                let screened = Cluster {
                    students,
                    ..Cluster::for_bus(&bus)
                };
                (bus, screened)
            })
            .collect();
        self.route_clusters(origin, fleet, stops, options, roster.invalid_entries())
    }

    /// Optimise one caller-supplied group directly and return its route.
    ///
    /// Students with unusable coordinates are left out of the path. The
    /// group is routed even when it exceeds the bus capacity; a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidInput`] for an unusable school,
    /// [`PlanError::EmptyCluster`] when no student can be routed, and
    /// [`PlanError::Optimize`] when the routing service fails or answers
    /// inconsistently.
    pub fn plan_single_cluster(
        &self,
        school: &Point,
        cluster: &Cluster,
        stops: &[Stop],
        options: &PlanOptions,
    ) -> Result<Route, PlanError> {
        let origin = school
            .position()
            .map_err(|_| RejectReason::InvalidSchool)?;
        let roster = Roster::screen(&cluster.students);
        if roster.valid.is_empty() {
            return Err(PlanError::EmptyCluster {
                bus_id: cluster.bus_id.clone(),
            });
        }
        if roster.valid.len() > cluster.seats() {
            warn!(
                "bus {} carries {} students but seats {}; routing anyway",
                cluster.bus_id,
                roster.valid.len(),
                cluster.capacity
            );
        }
        report_unusable_stops(stops);

        let failed = |source| PlanError::Optimize {
            bus_id: cluster.bus_id.clone(),
            source,
        };
        let bus = Bus::new(cluster.bus_id.clone(), cluster.capacity);
        let path = WaypointPath::build(origin, &roster.valid, stops, options.route_type);
        let request =
            OptimizeRequest::new(bus.id.clone(), path).with_options(options.optimize_options());
        let answer = self.optimizer.optimize(&request).map_err(failed)?;
        reconstruct_route(&bus, &request.path, &answer).map_err(failed)
    }

    /// Run clustering only, without contacting the routing service.
    ///
    /// Uses this planner's clustering configuration; see
    /// [`preview_clusters`] for the rules.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidInput`] under the same conditions that
    /// make [`plan_fleet`](Self::plan_fleet) reject a request.
    pub fn preview_clusters(
        &self,
        school: &Point,
        students: &[Student],
        buses: &[Bus],
        strategy: StrategyKind,
    ) -> Result<ClusterPreview, PlanError> {
        preview_clusters(&self.config, school, students, buses, strategy)
    }

    /// Truncate, build paths, optimise and aggregate.
    fn route_clusters(
        &self,
        school: GeoPoint,
        fleet: Vec<(Bus, Cluster)>,
        stops: &[Stop],
        options: &PlanOptions,
        mut unassigned: Vec<UnassignedStudent>,
    ) -> PlanResult {
        let mut buses = Vec::with_capacity(fleet.len());
        let mut requests = Vec::with_capacity(fleet.len());
        for (bus, mut cluster) in fleet {
            for student in truncate_overflow(&mut cluster) {
                warn!(
                    "bus {} is full; student {} left unassigned",
                    bus.id, student.id
                );
                unassigned.push(UnassignedStudent::new(
                    student.id,
                    UnassignedReason::CapacityExceeded,
                ));
            }
            if cluster.is_empty() {
                debug!("bus {} has no students; no route planned", bus.id);
                continue;
            }
            let path = WaypointPath::build(school, &cluster.students, stops, options.route_type);
            requests.push(
                OptimizeRequest::new(bus.id.clone(), path).with_options(options.optimize_options()),
            );
            buses.push(bus);
        }

        let results = if requests.is_empty() {
            Vec::new()
        } else if options.use_batch {
            self.optimizer.optimize_batch(&requests)
        } else {
            self.optimizer.optimize_all(&requests)
        };

        let mut outcomes = results.into_iter();
        let mut routes = Vec::with_capacity(requests.len());
        let mut failures = Vec::new();
        for (index, (bus, request)) in buses.iter().zip(&requests).enumerate() {
            let outcome = outcomes
                .next()
                .unwrap_or(Err(OptimizeError::MissingBatchItem { index }))
                .and_then(|answer| reconstruct_route(bus, &request.path, &answer));
            match outcome {
                Ok(route) => routes.push(route),
                Err(err) => {
                    warn!("route for bus {} failed: {err}", bus.id);
                    unassigned.extend(
                        request
                            .path
                            .waypoints()
                            .iter()
                            .filter(|waypoint| waypoint.kind == WaypointKind::Student)
                            .map(|waypoint| {
                                UnassignedStudent::new(
                                    waypoint.id.clone(),
                                    UnassignedReason::OptimizationFailed,
                                )
                            }),
                    );
                    failures.push(ClusterFailure {
                        bus_id: bus.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let status = if failures.is_empty() {
            PlanStatus::Success
        } else {
            PlanStatus::PartialFailure
        };
        info!(
            "planned {} routes; {} students unassigned, {} clusters failed",
            routes.len(),
            unassigned.len(),
            failures.len()
        );
        PlanResult {
            status,
            routes,
            unassigned,
            failures,
        }
    }
}

/// Refuse the request, accounting for every screened student.
fn reject(reason: RejectReason, roster: &Roster) -> PlanResult {
    warn!("planning request rejected: {reason}");
    PlanResult {
        status: PlanStatus::Rejected { reason },
        routes: Vec::new(),
        unassigned: roster.rejected_entries(),
        failures: Vec::new(),
    }
}

/// Remove and return the students beyond the cluster's capacity.
fn truncate_overflow(cluster: &mut Cluster) -> Vec<Student> {
    let seats = cluster.seats();
    if cluster.len() <= seats {
        return Vec::new();
    }
    cluster.students.split_off(seats)
}

/// Centroid of each cluster's members; empty clusters sit on the school.
fn cluster_centers(school: GeoPoint, clusters: &[Cluster]) -> Vec<Coord<f64>> {
    clusters
        .iter()
        .map(|cluster| {
            let members: MultiPoint<f64> = cluster
                .students
                .iter()
                .filter_map(|student| student.position().ok())
                .map(|position| position.coord())
                .collect();
            members
                .centroid()
                .map_or(school.coord(), |centroid| centroid.0)
        })
        .collect()
}

/// Clusters produced by a preview, plus the students that could not take
/// part in clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPreview {
    /// Strategy output. `unassigned` only holds students the fleet had no
    /// seat for.
    pub clustering: Clustering,
    /// Students with unusable coordinates, in input order.
    pub invalid_student_ids: Vec<String>,
}

/// Cluster `students` onto `buses` without any routing service.
///
/// Students with unusable coordinates are left out of every cluster and
/// reported in [`ClusterPreview::invalid_student_ids`], apart from the
/// strategy's own unassigned list. Tools that only preview groupings call
/// this directly instead of building a [`FleetPlanner`].
///
/// # Errors
///
/// Returns [`PlanError::InvalidInput`] when the school has no usable
/// position, there are no buses or no active buses, or no student has
/// usable coordinates.
pub fn preview_clusters(
    config: &PlannerConfig,
    school: &Point,
    students: &[Student],
    buses: &[Bus],
    strategy: StrategyKind,
) -> Result<ClusterPreview, PlanError> {
    let origin = school
        .position()
        .map_err(|_| RejectReason::InvalidSchool)?;
    if buses.is_empty() {
        return Err(RejectReason::NoBuses.into());
    }
    let active = active_buses(buses);
    if active.is_empty() {
        return Err(RejectReason::NoActiveBuses.into());
    }
    let roster = Roster::screen(students);
    if roster.valid.is_empty() {
        return Err(RejectReason::NoValidStudents.into());
    }
    let clustering =
        strategy_for(strategy, &config.clustering).cluster(origin, &roster.valid, &active);
    debug!(
        "previewed {strategy} clustering: {} placed, {} without a seat, {} with bad coordinates",
        clustering.assigned_count(),
        clustering.unassigned.len(),
        roster.invalid.len()
    );
    Ok(ClusterPreview {
        clustering,
        invalid_student_ids: roster.invalid,
    })
}

#[cfg(test)]
mod tests;
