//! Angular sweep around the school.

use log::debug;
use schoolbus_core::{
    Bus, Clustering, ClusteringStrategy, GeoPoint, StrategyKind, Student, bearing_degrees,
    distance_meters,
};

use crate::arena::{Arena, seats};
use crate::balancer::rebalance_adjacent;

/// Sort students by angle around the school, then fill buses in order.
///
/// Consecutive buses therefore serve contiguous wedges. Distance from the
/// school breaks angular ties, and input order breaks the rest.
///
/// # Examples
///
/// ```
/// use schoolbus_cluster::SweepStrategy;
/// use schoolbus_core::{Bus, ClusteringStrategy, GeoPoint, Student};
///
/// let school = GeoPoint::new(37.98, 23.73)?;
/// let students = vec![
///     Student::new("east", 37.98, 23.75),
///     Student::new("north", 38.00, 23.73),
///     Student::new("west", 37.98, 23.71),
/// ];
/// let buses = [Bus::new("b1", 2), Bus::new("b2", 2)];
/// let clustering = SweepStrategy.cluster(school, &students, &buses);
///
/// let first: Vec<&str> = clustering.clusters[0].student_ids().collect();
/// assert_eq!(first, ["east", "north"]);
/// # Ok::<(), schoolbus_core::CoordinateError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStrategy;

impl ClusteringStrategy for SweepStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sweep
    }

    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering {
        let arena = Arena::new(students);
        let mut keyed: Vec<(f64, f64, usize)> = arena
            .positions()
            .enumerate()
            .map(|(index, position)| {
                (
                    bearing_degrees(school, position),
                    distance_meters(school, position),
                    index,
                )
            })
            .collect();
        keyed.sort_by(|lhs, rhs| {
            lhs.0
                .total_cmp(&rhs.0)
                .then(lhs.1.total_cmp(&rhs.1))
                .then(lhs.2.cmp(&rhs.2))
        });

        let capacities = seats(buses);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); buses.len()];
        let mut bus = 0;
        for (_, _, index) in keyed {
            while capacities
                .get(bus)
                .zip(members.get(bus))
                .is_some_and(|(capacity, list)| list.len() >= *capacity)
            {
                bus += 1;
            }
            match members.get_mut(bus) {
                Some(list) => list.push(index),
                None => break,
            }
        }

        let mut clustering = arena.finish(buses, members);
        let moved = rebalance_adjacent(&mut clustering.clusters);
        debug!(
            "sweep placed {} students across {} buses ({} adjacency moves, {} unassigned)",
            clustering.assigned_count(),
            buses.len(),
            moved,
            clustering.unassigned.len()
        );
        clustering
    }
}
