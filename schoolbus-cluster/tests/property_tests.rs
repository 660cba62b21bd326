//! Property-based tests for the clustering strategies.
//!
//! # Invariants tested
//!
//! - **Coverage:** every input student appears exactly once, either in a
//!   cluster or in the unassigned list.
//! - **Capacity:** no strategy returns a cluster larger than its bus.
//! - **Validity:** students with unusable coordinates are never clustered.
//! - **Shape:** one cluster per bus, in bus order.
//! - **Saturation:** students are only left unassigned when every seat is
//!   taken or their coordinates are unusable.


use std::collections::HashMap;

use proptest::prelude::*;
use schoolbus_cluster::{ClusteringConfig, strategy_for};
use schoolbus_core::{Located, StrategyKind};

use proptest_support::{fleet_strategy, school, student_set_strategy};

fn strategy_kind() -> impl Strategy<Value = StrategyKind> {
    proptest::sample::select(StrategyKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: each student id is reported exactly once.
    #[test]
    fn every_student_is_accounted_for_once(
        kind in strategy_kind(),
        students in student_set_strategy(0, 40),
        buses in fleet_strategy(),
    ) {
        let clustering = strategy_for(kind, &ClusteringConfig::default())
            .cluster(school(), &students, &buses);

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for id in clustering
            .clusters
            .iter()
            .flat_map(|cluster| cluster.student_ids())
            .chain(clustering.unassigned.iter().map(String::as_str))
        {
            *seen.entry(id).or_default() += 1;
        }
        prop_assert_eq!(seen.len(), students.len());
        prop_assert!(seen.values().all(|&count| count == 1), "{kind}: {seen:?}");
    }

    /// Property: clusters never exceed their bus capacity.
    #[test]
    fn clusters_respect_capacity(
        kind in strategy_kind(),
        students in student_set_strategy(0, 40),
        buses in fleet_strategy(),
    ) {
        let clustering = strategy_for(kind, &ClusteringConfig::default())
            .cluster(school(), &students, &buses);
        for cluster in &clustering.clusters {
            prop_assert!(!cluster.is_over_capacity(), "{kind}: {cluster:?}");
        }
    }

    /// Property: invalid students stay out of every cluster.
    #[test]
    fn invalid_students_are_never_clustered(
        kind in strategy_kind(),
        students in student_set_strategy(1, 30),
        buses in fleet_strategy(),
    ) {
        let clustering = strategy_for(kind, &ClusteringConfig::default())
            .cluster(school(), &students, &buses);
        for cluster in &clustering.clusters {
            prop_assert!(cluster.students.iter().all(|student| student.position().is_ok()));
        }
    }

    /// Property: the output mirrors the fleet.
    #[test]
    fn one_cluster_per_bus_in_order(
        kind in strategy_kind(),
        students in student_set_strategy(0, 20),
        buses in fleet_strategy(),
    ) {
        let clustering = strategy_for(kind, &ClusteringConfig::default())
            .cluster(school(), &students, &buses);
        let cluster_ids: Vec<&str> = clustering
            .clusters
            .iter()
            .map(|c| c.bus_id.as_str())
            .collect();
        let bus_ids: Vec<&str> = buses.iter().map(|b| b.id.as_str()).collect();
        prop_assert_eq!(cluster_ids, bus_ids);
    }

    /// Property: valid students are only dropped once the fleet is full.
    #[test]
    fn valid_students_fill_the_fleet(
        kind in strategy_kind(),
        students in student_set_strategy(0, 40),
        buses in fleet_strategy(),
    ) {
        let clustering = strategy_for(kind, &ClusteringConfig::default())
            .cluster(school(), &students, &buses);
        let valid = students.iter().filter(|s| s.position().is_ok()).count();
        let seats: usize = buses.iter().map(|bus| bus.seats()).sum();
        prop_assert_eq!(clustering.assigned_count(), valid.min(seats), "{}", kind);
    }
}
