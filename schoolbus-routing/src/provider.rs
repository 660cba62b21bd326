//! HTTP-based `RouteOptimizer` using a calculate-route API with best-order
//! waypoint optimisation.
//!
//! # Architecture
//!
//! The [`RouteOptimizer`] trait is synchronous to keep planners embeddable
//! in synchronous contexts. This optimizer bridges the async HTTP calls to
//! the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use schoolbus_core::{
//!     GeoPoint, OptimizeRequest, RouteOptimizer, RouteType, Student, WaypointPath,
//! };
//! use schoolbus_routing::{HttpRouteOptimizer, HttpRouteOptimizerConfig};
//!
//! let optimizer = HttpRouteOptimizer::with_config(
//!     HttpRouteOptimizerConfig::new("https://api.tomtom.com").with_api_key("secret"),
//! )?;
//! let school = GeoPoint::new(37.98, 23.73)?;
//! let students = [Student::new("s1", 38.00, 23.70), Student::new("s2", 37.99, 23.75)];
//! let path = WaypointPath::build(school, &students, &[], RouteType::Pickup);
//!
//! let _answer = optimizer.optimize(&OptimizeRequest::new("b1", path))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use log::debug;
use reqwest::Client;
use schoolbus_core::{
    LegSummary, OptimizeError, OptimizeRequest, OptimizedPath, RouteOptimizer, WaypointReorder,
};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::form_urlencoded;

use crate::api::{BatchItem, BatchQuery, BatchRequest, BatchResponse, CalculateRouteResponse};

/// Error type for [`HttpRouteOptimizer`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "schoolbus-routing/0.1";

/// Default routing API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tomtom.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default vehicle profile.
const DEFAULT_TRAVEL_MODE: &str = "bus";

/// Default number of single-mode requests in flight at once.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Configuration for [`HttpRouteOptimizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRouteOptimizerConfig {
    /// Routing API root (e.g., `"https://api.tomtom.com"`).
    pub base_url: String,
    /// API key sent as the `key` query parameter, when set.
    pub api_key: Option<String>,
    /// Vehicle profile sent as `travelMode`.
    pub travel_mode: String,
    /// Per-request timeout, also used as the connect timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Upper bound on concurrent single-mode requests.
    pub max_concurrency: usize,
}

impl Default for HttpRouteOptimizerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            travel_mode: DEFAULT_TRAVEL_MODE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl HttpRouteOptimizerConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the vehicle profile.
    #[must_use]
    pub fn with_travel_mode(mut self, travel_mode: impl Into<String>) -> Self {
        self.travel_mode = travel_mode.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the single-mode concurrency limit. Zero is treated as one.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// HTTP-based route optimizer.
///
/// Each request submits the ordered waypoint coordinates and, when there
/// are at least two reorderable waypoints, asks the provider for the best
/// visiting order. The first and last waypoints stay fixed.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the optimizer uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the optimizer
/// falls back to its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may deadlock if the caller's runtime is
/// driving IO or timers that this request depends on.
///
/// # Transport modes
///
/// [`optimize_all`](RouteOptimizer::optimize_all) issues one request per
/// path, at most `max_concurrency` at a time.
/// [`optimize_batch`](RouteOptimizer::optimize_batch) packs every path into
/// one synchronous batch call and matches answers back by index.
pub struct HttpRouteOptimizer {
    client: Client,
    config: HttpRouteOptimizerConfig,
    runtime: Runtime,
}

impl fmt::Debug for HttpRouteOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouteOptimizer")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpRouteOptimizer {
    /// Create a new optimizer with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteOptimizerConfig::new(base_url))
    }

    /// Create a new optimizer with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpRouteOptimizerConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &HttpRouteOptimizerConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build the calculate-route URL, without query string.
    ///
    /// The format is `{base_url}/routing/1/calculateRoute/{locations}/json`
    /// where locations are colon-separated `lat,lon` pairs.
    fn route_url(&self, request: &OptimizeRequest) -> String {
        format!(
            "{}/routing/1/calculateRoute/{}/json",
            self.base(),
            request.path.coord_string()
        )
    }

    fn batch_url(&self) -> String {
        format!("{}/routing/1/batch/sync/json", self.base())
    }

    /// Query parameters describing one request, excluding the API key.
    fn route_params(&self, request: &OptimizeRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("travelMode", self.config.travel_mode.clone()),
            ("routeRepresentation", "summaryOnly".to_owned()),
            ("traffic", request.options.traffic.to_string()),
        ];
        if request.wants_best_order() {
            params.push(("computeBestOrder", "true".to_owned()));
        }
        if let Some(depart_at) = &request.options.depart_at {
            params.push(("departAt", depart_at.clone()));
        }
        if let Some(arrive_at) = &request.options.arrive_at {
            params.push(("arriveAt", arrive_at.clone()));
        }
        params
    }

    fn key_param(&self) -> Vec<(&'static str, String)> {
        self.config
            .api_key
            .iter()
            .map(|key| ("key", key.clone()))
            .collect()
    }

    /// Build the relative query a batch item carries for `request`.
    fn batch_query(&self, request: &OptimizeRequest) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.route_params(request))
            .finish();
        format!(
            "/calculateRoute/{}/json?{query}",
            request.path.coord_string()
        )
    }

    /// Run `future` to completion on whichever runtime is safe to block on.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Fetch one optimised route asynchronously.
    async fn fetch_route(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        if request.path.len() < 2 {
            return Err(OptimizeError::EmptyInput);
        }
        let url = self.route_url(request);
        debug!(
            "requesting route for bus {} through {} waypoints",
            request.bus_id,
            request.path.len()
        );

        let response = self
            .client
            .get(&url)
            .query(&self.key_param())
            .query(&self.route_params(request))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let body: CalculateRouteResponse =
            response
                .json()
                .await
                .map_err(|err| OptimizeError::ParseError {
                    message: err.to_string(),
                })?;

        convert_response(body)
    }

    /// Fetch every route, at most `max_concurrency` at a time, keeping
    /// request order.
    async fn fetch_all(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        stream::iter(requests.iter().map(|request| self.fetch_route(request)))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Submit every routable request in one batch call.
    async fn fetch_batch(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        let mut results: Vec<Option<Result<OptimizedPath, OptimizeError>>> = requests
            .iter()
            .map(|request| (request.path.len() < 2).then_some(Err(OptimizeError::EmptyInput)))
            .collect();
        let submitted: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, result)| result.is_none())
            .map(|(index, _)| index)
            .collect();

        if !submitted.is_empty() {
            let body = BatchRequest {
                batch_items: submitted
                    .iter()
                    .filter_map(|&index| requests.get(index))
                    .map(|request| BatchQuery {
                        query: self.batch_query(request),
                    })
                    .collect(),
            };
            debug!("submitting batch of {} route requests", body.batch_items.len());

            match self.post_batch(&body).await {
                Ok(response) => {
                    let mut items = response.batch_items.into_iter();
                    for &index in &submitted {
                        let outcome = items.next().map_or(
                            Err(OptimizeError::MissingBatchItem { index }),
                            |item| self.convert_batch_item(item),
                        );
                        if let Some(slot) = results.get_mut(index) {
                            *slot = Some(outcome);
                        }
                    }
                }
                Err(err) => {
                    for &index in &submitted {
                        if let Some(slot) = results.get_mut(index) {
                            *slot = Some(Err(err.clone()));
                        }
                    }
                }
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result.unwrap_or(Err(OptimizeError::MissingBatchItem { index }))
            })
            .collect()
    }

    async fn post_batch(&self, body: &BatchRequest) -> Result<BatchResponse, OptimizeError> {
        let url = self.batch_url();
        let response = self
            .client
            .post(&url)
            .query(&self.key_param())
            .json(body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        response
            .json()
            .await
            .map_err(|err| OptimizeError::ParseError {
                message: err.to_string(),
            })
    }

    /// Convert one batch item, treating non-200 statuses as HTTP errors.
    fn convert_batch_item(&self, item: BatchItem) -> Result<OptimizedPath, OptimizeError> {
        if item.status_code != 200 {
            return Err(OptimizeError::HttpError {
                url: self.batch_url(),
                status: item.status_code,
                message: item
                    .response
                    .error
                    .map(|error| error.description)
                    .unwrap_or_default(),
            });
        }
        convert_response(item.response)
    }

    /// Convert a reqwest error to an `OptimizeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> OptimizeError {
        if error.is_timeout() {
            return OptimizeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OptimizeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        OptimizeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert a calculate-route response to an `OptimizedPath`.
///
/// A route without per-leg summaries is a single leg, so its overall
/// summary stands in for the leg.
fn convert_response(response: CalculateRouteResponse) -> Result<OptimizedPath, OptimizeError> {
    if let Some(error) = response.error {
        return Err(OptimizeError::ServiceError {
            code: error.code.unwrap_or_else(|| "error".to_owned()),
            message: error.description,
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| OptimizeError::ParseError {
            message: "routing response missing routes array".to_owned(),
        })?;

    let leg = |summary: crate::api::Summary| LegSummary {
        distance_meters: summary.length_in_meters,
        duration_seconds: summary.travel_time_in_seconds,
    };
    let legs = if route.legs.is_empty() {
        vec![leg(route.summary)]
    } else {
        route.legs.into_iter().map(|item| leg(item.summary)).collect()
    };

    let reordering = response
        .optimized_waypoints
        .into_iter()
        .map(|waypoint| WaypointReorder {
            original_index: waypoint.provided_index,
            optimized_index: waypoint.optimized_index,
        })
        .collect();

    Ok(OptimizedPath { legs, reordering })
}

impl RouteOptimizer for HttpRouteOptimizer {
    /// Optimise one path.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`). See the type-level
    /// documentation for the `current_thread` fallback.
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPath, OptimizeError> {
        if request.path.len() < 2 {
            return Err(OptimizeError::EmptyInput);
        }
        self.block_on(self.fetch_route(request))
    }

    fn optimize_all(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        if requests.is_empty() {
            return Vec::new();
        }
        self.block_on(self.fetch_all(requests))
    }

    fn optimize_batch(
        &self,
        requests: &[OptimizeRequest],
    ) -> Vec<Result<OptimizedPath, OptimizeError>> {
        if requests.is_empty() {
            return Vec::new();
        }
        self.block_on(self.fetch_batch(requests))
    }
}
