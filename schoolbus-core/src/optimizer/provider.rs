//! Route optimizer trait plus its request and response types.

use crate::WaypointPath;

use super::error::OptimizeError;

/// Provider-side knobs shared by every request in a planning call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Ask the provider to account for live traffic.
    pub traffic: bool,
    /// Departure time, RFC 3339, passed through untouched.
    pub depart_at: Option<String>,
    /// Arrival time, RFC 3339, passed through untouched.
    pub arrive_at: Option<String>,
}

/// One cluster's path submitted for optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    /// Bus the path belongs to, for logging and error attribution.
    pub bus_id: String,
    /// Ordered waypoints; the first and last are fixed.
    pub path: WaypointPath,
    /// Provider knobs.
    pub options: OptimizeOptions,
}

impl OptimizeRequest {
    /// Construct a request with default options.
    pub fn new(bus_id: impl Into<String>, path: WaypointPath) -> Self {
        Self {
            bus_id: bus_id.into(),
            path,
            options: OptimizeOptions::default(),
        }
    }

    /// Replace the provider knobs.
    #[must_use]
    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether the provider should be asked to reorder the middle waypoints.
    ///
    /// Reordering a single middle waypoint cannot change anything.
    pub fn wants_best_order(&self) -> bool {
        self.path.middle().len() >= 2
    }
}

/// Distance and duration of one leg between consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegSummary {
    /// Road distance in metres.
    pub distance_meters: f64,
    /// Travel time in seconds.
    pub duration_seconds: f64,
}

/// Where one middle waypoint ended up after optimisation.
///
/// Both indices are relative to [`WaypointPath::middle`], never to the full
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaypointReorder {
    /// Index of the waypoint in the submitted middle.
    pub original_index: usize,
    /// Index of the waypoint in the optimised middle.
    pub optimized_index: usize,
}

/// Provider answer for one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizedPath {
    /// Legs in final visiting order; one fewer than the waypoint count.
    pub legs: Vec<LegSummary>,
    /// Middle reordering; empty when the provider kept the submitted order.
    pub reordering: Vec<WaypointReorder>,
}

/// Order waypoints and measure legs through an external routing service.
///
/// Implementations keep the first and last waypoints of every path fixed
/// and may only permute the middle. The trait is synchronous so planners
/// stay embeddable in synchronous contexts; asynchronous implementations
/// block internally.
///
/// # Examples
///
/// ```rust
/// use schoolbus_core::{
///     GeoPoint, LegSummary, OptimizeError, OptimizeRequest, OptimizedPath, RouteOptimizer,
///     RouteType, Student, WaypointPath,
/// };
///
/// struct FlatRate;
///
/// impl RouteOptimizer for FlatRate {
///     fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
///         let legs = request.path.len().saturating_sub(1);
///         Ok(OptimizedPath {
///             legs: vec![LegSummary { distance_meters: 100.0, duration_seconds: 10.0 }; legs],
///             reordering: Vec::new(),
///         })
///     }
/// }
///
/// let school = GeoPoint::new(37.98, 23.73)?;
/// let students = [Student::new("s1", 38.0, 23.7)];
/// let path = WaypointPath::build(school, &students, &[], RouteType::Pickup);
/// let answer = FlatRate.optimize(&OptimizeRequest::new("b1", path))?;
/// assert_eq!(answer.legs.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait RouteOptimizer: Send + Sync {
    /// Optimise one path.
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError>;

    /// Optimise many paths as independent requests.
    ///
    /// Results are returned in request order. The default runs requests one
    /// after another; implementations may overlap them.
    fn optimize_all(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        requests.iter().map(|request| self.optimize(request)).collect()
    }

    /// Optimise many paths in a single provider round-trip.
    ///
    /// Results are matched to requests by index. Implementations without a
    /// batch endpoint fall back to [`optimize_all`](Self::optimize_all).
    fn optimize_batch(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        self.optimize_all(requests)
    }
}
