//! Proptest strategies for fleet planning property tests.
//!
//! Students are scattered a few kilometres around a fixed school so that
//! every clustering strategy sees realistic, valid coordinates. A share of
//! generated students carry missing coordinates to exercise screening.

use proptest::prelude::*;
use schoolbus_core::{Bus, Point, StrategyKind, Student};

/// Latitude of the school used by every generated request.
pub const SCHOOL_LAT: f64 = 37.98;
/// Longitude of the school used by every generated request.
pub const SCHOOL_LON: f64 = 23.73;

/// The school all generated students travel to.
#[must_use]
pub fn school() -> Point {
    Point::new("school", SCHOOL_LAT, SCHOOL_LON)
}

/// Strategy for any of the clustering algorithms.
pub fn strategy_kind() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        Just(StrategyKind::Sweep),
        Just(StrategyKind::BalancedLoad),
        Just(StrategyKind::KMeans),
        Just(StrategyKind::Grid),
        Just(StrategyKind::DensityNearestNeighbour),
    ]
}

/// Strategy for a roster of `min_count..=max_count` students with unique
/// ids, roughly one in ten lacking coordinates.
pub fn student_set_strategy(
    min_count: usize,
    max_count: usize,
) -> impl Strategy<Value = Vec<Student>> {
    proptest::collection::vec(student_strategy(), min_count..=max_count).prop_map(|students| {
        // Re-assign ids by position so they stay unique.
        students
            .into_iter()
            .enumerate()
            .map(|(idx, student)| Student {
                id: format!("s{idx}"),
                ..student
            })
            .collect()
    })
}

#[expect(
    clippy::float_arithmetic,
    reason = "offsets are added to the school coordinates"
)]
fn student_strategy() -> impl Strategy<Value = Student> {
    let offset = -0.03_f64..0.03_f64;
    (offset.clone(), offset, 0_u8..10).prop_map(|(dlat, dlon, roll)| {
        if roll == 0 {
            Student::without_location("placeholder")
        } else {
            Student::new("placeholder", SCHOOL_LAT + dlat, SCHOOL_LON + dlon)
        }
    })
}

/// Strategy for a fleet of `1..=max_buses` buses with capacities up to
/// `max_capacity`, occasionally including an out-of-service bus.
pub fn fleet_strategy(max_buses: usize, max_capacity: u32) -> impl Strategy<Value = Vec<Bus>> {
    proptest::collection::vec(0..=max_capacity, 1..=max_buses).prop_map(|capacities| {
        capacities
            .into_iter()
            .enumerate()
            .map(|(idx, capacity)| Bus::new(format!("b{idx}"), capacity))
            .collect()
    })
}
