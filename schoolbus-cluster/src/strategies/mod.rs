//! The five clustering algorithms.
//!
//! Each strategy validates students through the shared arena, so students
//! without usable coordinates always come back unassigned rather than
//! being placed.

mod balanced;
mod density;
mod grid;
mod kmeans;
mod sweep;

pub use balanced::BalancedLoadStrategy;
pub use density::DensityStrategy;
pub use grid::GridStrategy;
pub use kmeans::KMeansStrategy;
pub use sweep::SweepStrategy;
