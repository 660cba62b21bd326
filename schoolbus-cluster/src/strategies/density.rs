//! Density-seeded nearest-neighbour growth.

use geo::Coord;
use log::debug;
use rstar::{AABB, RTree, RTreeObject};
use schoolbus_core::{
    Bus, Clustering, ClusteringStrategy, EARTH_RADIUS_METERS, GeoPoint, StrategyKind, Student,
    distance_meters,
};

use crate::ClusteringConfig;
use crate::arena::{Arena, seats};

/// Seed every bus with one of the most crowded students, then grow the
/// clusters round-robin by nearest neighbour.
///
/// A student's density is the number of other students within the
/// configured radius. Seeds are taken in descending density order, one per
/// bus with seats. Each round, every bus with a free seat claims the
/// unassigned student closest to any of its members.
#[derive(Debug, Clone, Copy)]
pub struct DensityStrategy {
    radius_meters: f64,
}

impl DensityStrategy {
    /// Construct with an explicit neighbourhood radius.
    pub const fn new(radius_meters: f64) -> Self {
        Self { radius_meters }
    }

    /// Construct from shared tunables.
    pub const fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.density_radius_meters)
    }
}

impl Default for DensityStrategy {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexedStudent {
    index: usize,
    location: Coord<f64>,
}

impl RTreeObject for IndexedStudent {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}

/// Degree envelope that contains every point within `radius_meters` of
/// `center`.
#[expect(
    clippy::float_arithmetic,
    reason = "converts a metric radius into a padded degree envelope"
)]
fn search_envelope(center: GeoPoint, radius_meters: f64) -> AABB<[f64; 2]> {
    let lat_pad = (radius_meters / EARTH_RADIUS_METERS).to_degrees() * 1.1;
    let cos_lat = center.lat().to_radians().cos();
    let lon_pad = if cos_lat > 1e-6 {
        (lat_pad / cos_lat).min(360.0)
    } else {
        360.0
    };
    AABB::from_corners(
        [center.lon() - lon_pad, center.lat() - lat_pad],
        [center.lon() + lon_pad, center.lat() + lat_pad],
    )
}

/// Number of other candidates within `radius_meters` of each candidate.
fn densities(arena: &Arena<'_>, radius_meters: f64) -> Vec<usize> {
    let tree = RTree::bulk_load(
        arena
            .positions()
            .enumerate()
            .map(|(index, position)| IndexedStudent {
                index,
                location: position.coord(),
            })
            .collect(),
    );
    arena
        .positions()
        .enumerate()
        .map(|(own, position)| {
            tree.locate_in_envelope(&search_envelope(position, radius_meters))
                .filter(|other| other.index != own)
                .filter(|other| distance_meters(position, other.location) <= radius_meters)
                .count()
        })
        .collect()
}

/// Growth state for one bus: its members and, per candidate, the distance
/// to the nearest member.
#[derive(Debug)]
struct Frontier {
    members: Vec<usize>,
    capacity: usize,
    nearest: Vec<f64>,
}

impl Frontier {
    fn new(capacity: usize, candidates: usize) -> Self {
        Self {
            members: Vec::new(),
            capacity,
            nearest: vec![f64::INFINITY; candidates],
        }
    }

    fn has_room(&self) -> bool {
        self.members.len() < self.capacity
    }

    fn admit(&mut self, arena: &Arena<'_>, index: usize) {
        if let Some(position) = arena.position(index) {
            for (candidate, best) in self.nearest.iter_mut().enumerate() {
                let distance = arena.distance_to(candidate, position);
                if distance < *best {
                    *best = distance;
                }
            }
        }
        self.members.push(index);
    }

    /// Closest unassigned candidate to any member; lower indices win ties.
    fn closest(&self, assigned: &[bool]) -> Option<usize> {
        self.nearest
            .iter()
            .zip(assigned)
            .enumerate()
            .filter(|(_, (distance, taken))| !**taken && distance.is_finite())
            .min_by(|lhs, rhs| (lhs.1).0.total_cmp((rhs.1).0).then(lhs.0.cmp(&rhs.0)))
            .map(|(index, _)| index)
    }
}

fn mark(assigned: &mut [bool], index: usize) {
    if let Some(slot) = assigned.get_mut(index) {
        *slot = true;
    }
}

impl ClusteringStrategy for DensityStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DensityNearestNeighbour
    }

    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering {
        let arena = Arena::new(students);
        let density = densities(&arena, self.radius_meters);
        let mut by_density: Vec<usize> = (0..arena.len()).collect();
        by_density.sort_by(|&lhs, &rhs| {
            let lhs_density = density.get(lhs).copied().unwrap_or_default();
            let rhs_density = density.get(rhs).copied().unwrap_or_default();
            rhs_density.cmp(&lhs_density).then(lhs.cmp(&rhs))
        });

        let mut assigned = vec![false; arena.len()];
        let mut frontiers: Vec<Frontier> = seats(buses)
            .into_iter()
            .map(|capacity| Frontier::new(capacity, arena.len()))
            .collect();

        let mut seeds = by_density.iter().copied();
        for frontier in frontiers.iter_mut().filter(|frontier| frontier.has_room()) {
            let Some(seed) = seeds.next() else {
                break;
            };
            frontier.admit(&arena, seed);
            mark(&mut assigned, seed);
        }

        loop {
            let mut grew = false;
            for frontier in frontiers.iter_mut().filter(|frontier| frontier.has_room()) {
                if let Some(next) = frontier.closest(&assigned) {
                    frontier.admit(&arena, next);
                    mark(&mut assigned, next);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        let remainder: Vec<usize> = assigned
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(index, _)| index)
            .collect();
        for index in remainder {
            let best = frontiers
                .iter()
                .enumerate()
                .filter(|(_, frontier)| frontier.has_room())
                .map(|(bus, frontier)| {
                    let reference = arena
                        .centroid(&frontier.members)
                        .unwrap_or_else(|| school.coord());
                    (bus, arena.distance_to(index, reference))
                })
                .min_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1).then(lhs.0.cmp(&rhs.0)));
            if let Some(frontier) = best.and_then(|(bus, _)| frontiers.get_mut(bus)) {
                frontier.admit(&arena, index);
                mark(&mut assigned, index);
            }
        }

        let members = frontiers.into_iter().map(|frontier| frontier.members).collect();
        let clustering = arena.finish(buses, members);
        debug!(
            "density growth placed {} students across {} buses ({} unassigned)",
            clustering.assigned_count(),
            buses.len(),
            clustering.unassigned.len()
        );
        clustering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstar::Envelope;
    use rstest::{fixture, rstest};

    #[fixture]
    fn school() -> GeoPoint {
        GeoPoint::new(37.98, 23.73).expect("valid school")
    }

    #[rstest]
    fn density_counts_neighbours_within_radius() {
        // Roughly 111 m apart on a meridian, with one outlier 11 km away.
        let students = vec![
            Student::new("a", 38.000, 23.73),
            Student::new("b", 38.001, 23.73),
            Student::new("c", 38.002, 23.73),
            Student::new("far", 38.100, 23.73),
        ];
        let arena = Arena::new(&students);
        assert_eq!(densities(&arena, 150.0), [1, 2, 1, 0]);
        assert_eq!(densities(&arena, 500.0), [2, 2, 2, 0]);
    }

    #[rstest]
    fn envelope_covers_the_radius_at_high_latitude() {
        let center = GeoPoint::new(69.0, 18.0).expect("valid point");
        let east = Coord { x: 18.0 + 0.0125, y: 69.0 };
        let envelope = search_envelope(center, 500.0);
        assert!(distance_meters(center, east) < 500.0);
        assert!(envelope.contains_point(&[east.x, east.y]));
    }

    #[rstest]
    fn seeds_follow_density_order(school: GeoPoint) {
        let students = vec![
            Student::new("loner", 38.10, 23.90),
            Student::new("c1", 38.000, 23.73),
            Student::new("c2", 38.001, 23.73),
            Student::new("c3", 38.002, 23.73),
        ];
        let buses = [Bus::new("b1", 3), Bus::new("b2", 3)];
        let clustering = DensityStrategy::default().cluster(school, &students, &buses);
        // c1 and c2 are the two densest, so each seeds a bus before growth.
        assert_eq!(clustering.clusters[0].student_ids().collect::<Vec<_>>(), ["c1", "c3"]);
        assert_eq!(clustering.clusters[1].student_ids().collect::<Vec<_>>(), ["c2", "loner"]);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "fixture coordinates are computed")]
    fn growth_follows_nearest_neighbours(school: GeoPoint) {
        let students: Vec<Student> = (0..6)
            .map(|i| Student::new(format!("s{i}"), 38.0 + f64::from(i) * 0.001, 23.73))
            .collect();
        let clustering =
            DensityStrategy::default().cluster(school, &students, &[Bus::new("b1", 6)]);
        assert_eq!(clustering.assigned_count(), 6);
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "fixture coordinates are computed")]
    fn full_fleet_leaves_remainder_unassigned(school: GeoPoint) {
        let students: Vec<Student> = (0..5)
            .map(|i| Student::new(format!("s{i}"), 38.0 + f64::from(i) * 0.01, 23.73))
            .collect();
        let clustering =
            DensityStrategy::default().cluster(school, &students, &[Bus::new("b1", 2)]);
        assert_eq!(clustering.assigned_count(), 2);
        assert_eq!(clustering.unassigned.len(), 3);
    }
}
