//! Capacity-constrained geographic k-means.

use std::f64::consts::TAU;

use geo::Coord;
use log::debug;
use schoolbus_core::{Bus, Clustering, ClusteringStrategy, GeoPoint, StrategyKind, Student};

use crate::ClusteringConfig;
use crate::arena::{Arena, count_f64, seats};
use crate::balancer::balance_clusters;

/// One centre per bus, seeded on a small circle around the school and
/// refined by alternating capacity-respecting assignment with centroid
/// updates.
///
/// Assignment is greedy rather than classic k-means: students are taken
/// nearest-to-school first and each goes to the nearest centre that still
/// has a free seat. After convergence the neighbouring-cluster balancer runs
/// against the final centres.
#[derive(Debug, Clone, Copy)]
pub struct KMeansStrategy {
    max_iterations: usize,
    epsilon_degrees: f64,
    seed_radius_degrees: f64,
    balancer_radius_meters: f64,
}

impl KMeansStrategy {
    /// Construct from shared tunables.
    pub const fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            max_iterations: config.kmeans_max_iterations,
            epsilon_degrees: config.kmeans_epsilon_degrees,
            seed_radius_degrees: config.kmeans_seed_radius_degrees,
            balancer_radius_meters: config.balancer_radius_meters,
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "seed centres are placed by trigonometry on raw degrees"
    )]
    fn seed_centers(&self, school: GeoPoint, count: usize) -> Vec<Coord<f64>> {
        let step = TAU / count_f64(count.max(1));
        (0..count)
            .map(|k| {
                let angle = step * count_f64(k);
                Coord {
                    x: school.lon() + self.seed_radius_degrees * angle.cos(),
                    y: school.lat() + self.seed_radius_degrees * angle.sin(),
                }
            })
            .collect()
    }
}

impl Default for KMeansStrategy {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

/// Greedy nearest-centre assignment honouring capacities.
fn assign(
    arena: &Arena<'_>,
    order: &[usize],
    centers: &[Coord<f64>],
    capacities: &[usize],
) -> Vec<Vec<usize>> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centers.len()];
    for &index in order {
        let nearest = members
            .iter()
            .zip(capacities)
            .zip(centers)
            .enumerate()
            .filter(|(_, ((list, capacity), _))| list.len() < **capacity)
            .map(|(bus, (_, &center))| (bus, arena.distance_to(index, center)))
            .min_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1).then(lhs.0.cmp(&rhs.0)));
        if let Some(list) = nearest.and_then(|(bus, _)| members.get_mut(bus)) {
            list.push(index);
        }
    }
    members
}

#[expect(
    clippy::float_arithmetic,
    reason = "convergence compares centre displacement in degrees"
)]
fn largest_shift(before: &[Coord<f64>], after: &[Coord<f64>]) -> f64 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| (a.x - b.x).hypot(a.y - b.y))
        .fold(0.0, f64::max)
}

impl ClusteringStrategy for KMeansStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::KMeans
    }

    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering {
        let arena = Arena::new(students);
        let capacities = seats(buses);
        let order = arena.nearest_first(school);
        let mut centers = self.seed_centers(school, buses.len());
        let mut members = Vec::new();
        let mut rounds = 0;

        for round in 1..=self.max_iterations.max(1) {
            rounds = round;
            members = assign(&arena, &order, &centers, &capacities);
            let updated: Vec<Coord<f64>> = members
                .iter()
                .zip(&centers)
                .map(|(list, &center)| arena.centroid(list).unwrap_or(center))
                .collect();
            let shift = largest_shift(&centers, &updated);
            centers = updated;
            if shift <= self.epsilon_degrees {
                break;
            }
        }

        let mut clustering = arena.finish(buses, members);
        let moved = balance_clusters(
            &mut clustering.clusters,
            &centers,
            self.balancer_radius_meters,
        );
        debug!(
            "k-means settled after {rounds} rounds ({} placed, {} unassigned, {moved} moved)",
            clustering.assigned_count(),
            clustering.unassigned.len()
        );
        clustering
    }
}
