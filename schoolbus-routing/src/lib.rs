//! Routing-service adapters for the school bus planning engine.
//!
//! This crate provides [`HttpRouteOptimizer`], an implementation of
//! [`schoolbus_core::RouteOptimizer`] that submits each cluster's waypoint
//! path to a calculate-route API, asks for the best visiting order of the
//! middle waypoints and returns per-leg distances and durations.
//!
//! Two transports are offered. Single mode sends one request per cluster
//! with bounded concurrency; batch mode packs every cluster into one
//! synchronous batch call. Both preserve request order in their results.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use schoolbus_routing::{HttpRouteOptimizer, HttpRouteOptimizerConfig};
//!
//! let config = HttpRouteOptimizerConfig::new("https://api.tomtom.com")
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_max_concurrency(8);
//! let optimizer = HttpRouteOptimizer::with_config(config)?;
//! # Ok::<(), schoolbus_routing::ProviderBuildError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod api;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRouteOptimizer, HttpRouteOptimizerConfig,
    ProviderBuildError,
};
