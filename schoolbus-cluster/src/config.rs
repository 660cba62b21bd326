//! Tunables shared by the clustering strategies and the balancer.

/// Algorithm constants for every strategy.
///
/// # Examples
///
/// ```
/// use schoolbus_cluster::ClusteringConfig;
///
/// let config = ClusteringConfig::default().with_density_radius_meters(750.0);
/// assert_eq!(config.load_penalty_weight, 1_000.0);
/// assert_eq!(config.density_radius_meters, 750.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Metres of detour traded for one student of load imbalance in the
    /// balanced-load strategy.
    pub load_penalty_weight: f64,
    /// Upper bound on k-means assignment rounds.
    pub kmeans_max_iterations: usize,
    /// K-means stops once no centre moves further than this, in degrees.
    pub kmeans_epsilon_degrees: f64,
    /// Radius of the circle k-means seeds its centres on, in degrees.
    pub kmeans_seed_radius_degrees: f64,
    /// Neighbourhood radius for the density estimate, in metres.
    pub density_radius_meters: f64,
    /// Clusters whose centres are within this distance exchange students.
    pub balancer_radius_meters: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            load_penalty_weight: 1_000.0,
            kmeans_max_iterations: 50,
            kmeans_epsilon_degrees: 0.000_1,
            kmeans_seed_radius_degrees: 0.01,
            density_radius_meters: 500.0,
            balancer_radius_meters: 1_000.0,
        }
    }
}

impl ClusteringConfig {
    /// Set the balanced-load penalty weight.
    #[must_use]
    pub const fn with_load_penalty_weight(mut self, weight: f64) -> Self {
        self.load_penalty_weight = weight;
        self
    }

    /// Set the k-means iteration cap.
    #[must_use]
    pub const fn with_kmeans_max_iterations(mut self, iterations: usize) -> Self {
        self.kmeans_max_iterations = iterations;
        self
    }

    /// Set the k-means convergence threshold.
    #[must_use]
    pub const fn with_kmeans_epsilon_degrees(mut self, epsilon: f64) -> Self {
        self.kmeans_epsilon_degrees = epsilon;
        self
    }

    /// Set the density neighbourhood radius.
    #[must_use]
    pub const fn with_density_radius_meters(mut self, radius: f64) -> Self {
        self.density_radius_meters = radius;
        self
    }

    /// Set the balancer neighbour radius.
    #[must_use]
    pub const fn with_balancer_radius_meters(mut self, radius: f64) -> Self {
        self.balancer_radius_meters = radius;
        self
    }
}
