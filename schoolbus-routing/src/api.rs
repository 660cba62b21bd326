//! Wire types for the calculate-route and batch routing endpoints.
//!
//! Responses are deserialised leniently: every collection defaults to empty
//! so that a provider omitting `optimizedWaypoints` (no reordering
//! performed) or `legs` (two-waypoint routes) still parses.

use serde::{Deserialize, Serialize};

/// Travel distance and time for a whole route or one leg.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Road distance in metres.
    pub length_in_meters: f64,
    /// Travel time in seconds, including traffic delay when requested.
    pub travel_time_in_seconds: f64,
}

/// One leg between consecutive waypoints of the returned route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    /// Leg totals.
    pub summary: Summary,
}

/// A single computed route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteBody {
    /// Whole-route totals.
    pub summary: Summary,
    /// Legs in visiting order.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Position of one middle waypoint before and after best-order
/// optimisation. Both indices exclude the fixed first and last waypoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedWaypoint {
    /// Index in the submitted middle.
    pub provided_index: usize,
    /// Index in the optimised middle.
    pub optimized_index: usize,
}

/// Error body returned in place of routes.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Provider error code, when supplied.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// Response of the calculate-route endpoint, standalone or inside a batch
/// item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRouteResponse {
    /// Computed routes; the first is used.
    #[serde(default)]
    pub routes: Vec<RouteBody>,
    /// Middle reordering; empty when no best-order computation happened.
    #[serde(default)]
    pub optimized_waypoints: Vec<OptimizedWaypoint>,
    /// Present when the provider rejected the request.
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// One query within a batch submission.
#[derive(Debug, Clone, Serialize)]
pub struct BatchQuery {
    /// Path and query string relative to the routing API root, for example
    /// `/calculateRoute/37.9,23.7:37.98,23.73/json?travelMode=bus`.
    pub query: String,
}

/// Batch submission body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Queries in submission order.
    pub batch_items: Vec<BatchQuery>,
}

/// Per-query outcome within a batch response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// HTTP status the query would have produced on its own.
    pub status_code: u16,
    /// The query's response body.
    #[serde(default)]
    pub response: CalculateRouteResponse,
}

/// Batch response body; items follow submission order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// Outcomes in submission order.
    #[serde(default)]
    pub batch_items: Vec<BatchItem>,
}
