//! Capacity assignments of students to buses and the strategy seam that
//! produces them.

use std::fmt;
use std::str::FromStr;

use crate::{Bus, GeoPoint, Student};

/// Students provisionally assigned to one bus.
///
/// `students.len() <= capacity` is the goal state. Strategies may violate it
/// transiently; the planner truncates anything still over capacity and
/// reports the overflow as unassigned.
///
/// # Examples
/// ```
/// use schoolbus_core::{Bus, Cluster, Student};
///
/// let mut cluster = Cluster::for_bus(&Bus::new("b1", 2));
/// cluster.students.push(Student::new("s1", 37.99, 23.74));
/// assert_eq!(cluster.remaining(), 1);
/// assert!(!cluster.is_over_capacity());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    /// Bus the students are assigned to.
    pub bus_id: String,
    /// Seat capacity of that bus.
    pub capacity: u32,
    /// Assigned students in assignment order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub students: Vec<Student>,
}

impl Cluster {
    /// An empty cluster for `bus`.
    pub fn for_bus(bus: &Bus) -> Self {
        Self {
            bus_id: bus.id.clone(),
            capacity: bus.capacity,
            students: Vec::new(),
        }
    }

    /// Number of assigned students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Whether no students are assigned.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Seat capacity as a collection length.
    pub fn seats(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(usize::MAX)
    }

    /// Free seats left; zero when full or over capacity.
    pub fn remaining(&self) -> usize {
        self.seats().saturating_sub(self.len())
    }

    /// Whether more students are assigned than the bus can seat.
    pub fn is_over_capacity(&self) -> bool {
        self.len() > self.seats()
    }

    /// Identifiers of the assigned students, in order.
    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.students.iter().map(|student| student.id.as_str())
    }
}

/// Output of a clustering strategy.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clustering {
    /// One cluster per active bus, in bus order.
    pub clusters: Vec<Cluster>,
    /// Students no bus had room for.
    #[cfg_attr(feature = "serde", serde(default))]
    pub unassigned: Vec<String>,
}

impl Clustering {
    /// Total number of students placed in clusters.
    pub fn assigned_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

/// The interchangeable clustering algorithms.
///
/// # Examples
/// ```
/// use schoolbus_core::StrategyKind;
///
/// let kind: StrategyKind = "kmeans".parse()?;
/// assert_eq!(kind, StrategyKind::KMeans);
/// assert_eq!(StrategyKind::default(), StrategyKind::BalancedLoad);
/// # Ok::<(), String>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyKind {
    /// Angular sweep around the school.
    #[cfg_attr(feature = "serde", serde(rename = "sweep"))]
    Sweep,
    /// Greedy insertion balancing load against detour.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "balanced", alias = "balanced_load"))]
    BalancedLoad,
    /// Capacity-constrained geographic k-means.
    #[cfg_attr(feature = "serde", serde(rename = "kmeans", alias = "k_means"))]
    KMeans,
    /// Bounding-box grid bucketing.
    #[cfg_attr(feature = "serde", serde(rename = "grid"))]
    Grid,
    /// Density-seeded nearest-neighbour growth.
    #[cfg_attr(feature = "serde", serde(rename = "density", alias = "density_nn"))]
    DensityNearestNeighbour,
}

impl StrategyKind {
    /// Every strategy, in a stable order.
    pub const ALL: [Self; 5] = [
        Self::Sweep,
        Self::BalancedLoad,
        Self::KMeans,
        Self::Grid,
        Self::DensityNearestNeighbour,
    ];

    /// Canonical lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sweep => "sweep",
            Self::BalancedLoad => "balanced",
            Self::KMeans => "kmeans",
            Self::Grid => "grid",
            Self::DensityNearestNeighbour => "density",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sweep" => Ok(Self::Sweep),
            "balanced" | "balanced_load" => Ok(Self::BalancedLoad),
            "kmeans" | "k_means" => Ok(Self::KMeans),
            "grid" => Ok(Self::Grid),
            "density" | "density_nn" => Ok(Self::DensityNearestNeighbour),
            _ => Err(format!("unknown clustering strategy '{s}'")),
        }
    }
}

/// Partition students into per-bus clusters under capacity constraints.
///
/// Implementations receive students that already passed coordinate
/// validation; any that somehow lack a usable position must be reported in
/// [`Clustering::unassigned`] rather than processed. Buses are expected to be
/// active (positive capacity). The result holds one cluster per bus, in bus
/// order, and every input student appears exactly once across the clusters
/// and the unassigned list.
pub trait ClusteringStrategy: Send + Sync {
    /// Which algorithm this is.
    fn kind(&self) -> StrategyKind;

    /// Partition `students` across `buses` around `school`.
    fn cluster(&self, school: GeoPoint, students: &[Student], buses: &[Bus]) -> Clustering;
}
