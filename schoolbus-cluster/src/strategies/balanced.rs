//! Greedy insertion that trades load imbalance against detour.

use log::debug;
use schoolbus_core::{
    Bus, Clustering, ClusteringStrategy, GeoPoint, StrategyKind, Student, distance_meters,
};

use crate::ClusteringConfig;
use crate::arena::{Arena, count_f64, seats};

/// Assign students nearest-first to the bus with the lowest combined cost of
/// detour and deviation from its fair share of the load.
///
/// Each bus's fair share is proportional to its capacity. The detour of a
/// candidate is estimated against the bus's most recently assigned student,
/// or the school for an empty bus.
#[derive(Debug, Clone, Copy)]
pub struct BalancedLoadStrategy {
    load_penalty_weight: f64,
}

impl BalancedLoadStrategy {
    /// Construct with an explicit penalty weight, in metres per student of
    /// imbalance.
    pub const fn new(load_penalty_weight: f64) -> Self {
        Self {
            load_penalty_weight,
        }
    }

    /// Construct from shared tunables.
    pub const fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.load_penalty_weight)
    }
}

impl Default for BalancedLoadStrategy {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "detour estimates combine great-circle distances"
)]
fn added_distance(last: GeoPoint, candidate: GeoPoint, school: GeoPoint) -> f64 {
    distance_meters(last, candidate) + distance_meters(candidate, school)
        - distance_meters(last, school)
}

impl BalancedLoadStrategy {
    #[expect(
        clippy::float_arithmetic,
        reason = "scores weigh metres of detour against fractional load targets"
    )]
    fn score(&self, detour: f64, new_size: usize, target: f64) -> f64 {
        detour + self.load_penalty_weight * (count_f64(new_size) - target).abs()
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "fair shares split the student count by capacity ratios"
)]
fn fair_shares(students: usize, capacities: &[usize]) -> Vec<f64> {
    let total: usize = capacities.iter().sum();
    if total == 0 {
        return vec![0.0; capacities.len()];
    }
    let student_count = count_f64(students);
    let seat_count = count_f64(total);
    capacities
        .iter()
        .map(|&capacity| student_count * count_f64(capacity) / seat_count)
        .collect()
}

impl ClusteringStrategy for BalancedLoadStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BalancedLoad
    }

    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering {
        let arena = Arena::new(students);
        let capacities = seats(buses);
        let targets = fair_shares(arena.len(), &capacities);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); buses.len()];

        for index in arena.nearest_first(school) {
            let Some(position) = arena.position(index) else {
                continue;
            };
            let mut best: Option<(usize, f64)> = None;
            for (bus, (list, (&capacity, &target))) in members
                .iter()
                .zip(capacities.iter().zip(&targets))
                .enumerate()
            {
                if list.len() >= capacity {
                    continue;
                }
                let last = list
                    .last()
                    .and_then(|&member| arena.position(member))
                    .unwrap_or(school);
                let score = self.score(
                    added_distance(last, position, school),
                    list.len() + 1,
                    target,
                );
                if best.is_none_or(|(_, best_score)| score < best_score) {
                    best = Some((bus, score));
                }
            }
            if let Some(list) = best.and_then(|(bus, _)| members.get_mut(bus)) {
                list.push(index);
            }
        }

        let clustering = arena.finish(buses, members);
        debug!(
            "balanced load placed {} students across {} buses ({} unassigned)",
            clustering.assigned_count(),
            buses.len(),
            clustering.unassigned.len()
        );
        clustering
    }
}
