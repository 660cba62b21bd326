//! Planner inputs and knobs.

use schoolbus_cluster::ClusteringConfig;
use schoolbus_core::{Bus, OptimizeOptions, Point, RouteType, Stop, StrategyKind, Student};

/// Everything a fleet planning call needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetRequest {
    /// School the routes start or end at.
    pub school: Point,
    /// Students to place, in input order.
    pub students: Vec<Student>,
    /// Available buses, in input order.
    pub buses: Vec<Bus>,
    /// Intermediate stops inserted into every route.
    pub stops: Vec<Stop>,
}

impl FleetRequest {
    /// A request without intermediate stops.
    pub fn new(school: Point, students: Vec<Student>, buses: Vec<Bus>) -> Self {
        Self {
            school,
            students,
            buses,
            stops: Vec::new(),
        }
    }

    /// Set the intermediate stops.
    #[must_use]
    pub fn with_stops(mut self, stops: Vec<Stop>) -> Self {
        self.stops = stops;
        self
    }
}

/// Per-call planning options.
///
/// # Examples
///
/// ```
/// use schoolbus_core::{RouteType, StrategyKind};
/// use schoolbus_planner::PlanOptions;
///
/// let options = PlanOptions::default()
///     .with_strategy(StrategyKind::Sweep)
///     .with_route_type(RouteType::Dropoff)
///     .with_batch(true);
/// assert!(options.use_batch);
/// assert!(options.rebalance);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Clustering algorithm for fleet planning.
    pub strategy: StrategyKind,
    /// Send every cluster in one batch call instead of one request each.
    pub use_batch: bool,
    /// Direction policy for every path.
    pub route_type: RouteType,
    /// Run the neighbouring-cluster balancer after clustering.
    pub rebalance: bool,
    /// Ask the provider to account for live traffic.
    pub traffic: bool,
    /// Departure time, RFC 3339.
    pub depart_at: Option<String>,
    /// Arrival time, RFC 3339.
    pub arrive_at: Option<String>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::BalancedLoad,
            use_batch: false,
            route_type: RouteType::Pickup,
            rebalance: true,
            traffic: false,
            depart_at: None,
            arrive_at: None,
        }
    }
}

impl PlanOptions {
    /// Set the clustering strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Choose batch or single transport.
    #[must_use]
    pub const fn with_batch(mut self, use_batch: bool) -> Self {
        self.use_batch = use_batch;
        self
    }

    /// Set the direction policy.
    #[must_use]
    pub const fn with_route_type(mut self, route_type: RouteType) -> Self {
        self.route_type = route_type;
        self
    }

    /// Enable or disable the balancer pass.
    #[must_use]
    pub const fn with_rebalance(mut self, rebalance: bool) -> Self {
        self.rebalance = rebalance;
        self
    }

    /// Ask the provider to account for live traffic.
    #[must_use]
    pub const fn with_traffic(mut self, traffic: bool) -> Self {
        self.traffic = traffic;
        self
    }

    /// Plan for a departure at `depart_at` (RFC 3339).
    #[must_use]
    pub fn with_depart_at(mut self, depart_at: impl Into<String>) -> Self {
        self.depart_at = Some(depart_at.into());
        self
    }

    /// Plan for an arrival by `arrive_at` (RFC 3339).
    #[must_use]
    pub fn with_arrive_at(mut self, arrive_at: impl Into<String>) -> Self {
        self.arrive_at = Some(arrive_at.into());
        self
    }

    /// Provider knobs carried by every optimisation request.
    pub(crate) fn optimize_options(&self) -> OptimizeOptions {
        OptimizeOptions {
            traffic: self.traffic,
            depart_at: self.depart_at.clone(),
            arrive_at: self.arrive_at.clone(),
        }
    }
}

/// Configuration for [`FleetPlanner`](crate::FleetPlanner).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannerConfig {
    /// Tunables handed to every clustering strategy and the balancer.
    pub clustering: ClusteringConfig,
}
