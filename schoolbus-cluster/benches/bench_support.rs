//! Deterministic student populations for the clustering benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use schoolbus_core::{Bus, Student};

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// School location shared by every benchmark.
pub const SCHOOL: (f64, f64) = (37.98, 23.73);

/// Number of neighbourhoods students are drawn from.
const NEIGHBOURHOOD_COUNT: usize = 6;

/// Spread of students around a neighbourhood centre, in degrees (about
/// 400 m).
const NEIGHBOURHOOD_SPREAD: f64 = 0.004;

/// Half-width of the square neighbourhood centres are placed in, in degrees.
const CATCHMENT: f64 = 0.05;

/// Generate `count` students clustered into neighbourhoods around the
/// school.
#[must_use]
pub fn generate_students(count: usize, seed: u64) -> Vec<Student> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centres: Vec<(f64, f64)> = (0..NEIGHBOURHOOD_COUNT)
        .map(|_| {
            (
                rng.gen_range(-CATCHMENT..CATCHMENT),
                rng.gen_range(-CATCHMENT..CATCHMENT),
            )
        })
        .collect();
    let Ok(spread) = Normal::new(0.0, NEIGHBOURHOOD_SPREAD) else {
        return Vec::new();
    };

    (0..count)
        .zip(centres.iter().cycle())
        .map(|(i, &(dlat, dlon))| {
            #[expect(clippy::float_arithmetic, reason = "Required for coordinate offset")]
            let (lat, lon) = (
                SCHOOL.0 + dlat + spread.sample(&mut rng),
                SCHOOL.1 + dlon + spread.sample(&mut rng),
            );
            Student::new(format!("s{i}"), lat, lon)
        })
        .collect()
}

/// A fleet of buses whose combined capacity just covers `students`.
#[must_use]
pub fn fleet_for(students: usize, capacity: u32) -> Vec<Bus> {
    let seats = usize::try_from(capacity).unwrap_or(1).max(1);
    (0..students.div_ceil(seats))
        .map(|i| Bus::new(format!("b{i}"), capacity))
        .collect()
}
