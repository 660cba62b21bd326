//! `plan` command: cluster, route and print a fleet plan.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use schoolbus_core::{PlanResult, RouteOptimizer, RouteType, StrategyKind};
use schoolbus_planner::{FleetPlanner, PlanOptions};
use schoolbus_routing::{HttpRouteOptimizer, HttpRouteOptimizerConfig};
use serde::{Deserialize, Serialize};

use crate::request::{RequestFile, emit_json, load_request, require_file};
use crate::{
    ARG_API_KEY, ARG_ARRIVE_AT, ARG_BASE_URL, ARG_DEPART_AT, ARG_MAX_CONCURRENCY, ARG_OUTPUT,
    ARG_REQUEST, ARG_ROUTE_TYPE, ARG_STRATEGY, ARG_TIMEOUT_SECS, ARG_TRAFFIC, ARG_USE_BATCH,
    CliError, ENV_PLAN_REQUEST,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan routes for a school's fleet. The request file holds \
                 the school, students, buses and optional stops; students \
                 are clustered onto buses and each cluster's stop order is \
                 optimised by the routing service. Flags override planning \
                 choices made in the request file.",
    about = "Plan routes for every bus in a request"
)]
#[ortho_config(prefix = "SCHOOLBUS")]
pub(crate) struct PlanArgs {
    /// Path to a JSON request file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL of the routing service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// API key sent with every routing request.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Maximum routing requests in flight at once.
    #[arg(long = ARG_MAX_CONCURRENCY, value_name = "count")]
    #[serde(default)]
    pub(crate) max_concurrency: Option<usize>,
    /// Clustering strategy (sweep, balanced, kmeans, grid, density).
    #[arg(long = ARG_STRATEGY, value_name = "name")]
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    /// Route direction (pickup, dropoff, mixed).
    #[arg(long = ARG_ROUTE_TYPE, value_name = "type")]
    #[serde(default)]
    pub(crate) route_type: Option<String>,
    /// Send every cluster in one batch request.
    #[arg(long = ARG_USE_BATCH, num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) use_batch: Option<bool>,
    /// Ask the routing service to account for live traffic.
    #[arg(long = ARG_TRAFFIC, num_args = 0..=1, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) traffic: Option<bool>,
    /// Departure time (RFC 3339) for every route.
    #[arg(long = ARG_DEPART_AT, value_name = "time")]
    #[serde(default)]
    pub(crate) depart_at: Option<String>,
    /// Arrival time (RFC 3339) for every route.
    #[arg(long = ARG_ARRIVE_AT, value_name = "time")]
    #[serde(default)]
    pub(crate) arrive_at: Option<String>,
    /// Write the plan to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct PlanConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) optimizer: HttpRouteOptimizerConfig,
    pub(crate) strategy: Option<StrategyKind>,
    pub(crate) route_type: Option<RouteType>,
    pub(crate) use_batch: Option<bool>,
    pub(crate) traffic: Option<bool>,
    pub(crate) timing: Option<Timing>,
    pub(crate) output: Option<Utf8PathBuf>,
}

/// When the routes should run. Departure and arrival are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Timing {
    DepartAt(String),
    ArriveAt(String),
}

impl Timing {
    fn from_parts(
        depart_at: Option<String>,
        arrive_at: Option<String>,
    ) -> Result<Option<Self>, CliError> {
        match (depart_at, arrive_at) {
            (Some(_), Some(_)) => Err(CliError::InvalidOption {
                field: ARG_ARRIVE_AT,
                message: format!("cannot be combined with --{ARG_DEPART_AT}"),
            }),
            (Some(time), None) => Ok(Some(Self::DepartAt(time))),
            (None, Some(time)) => Ok(Some(Self::ArriveAt(time))),
            (None, None) => Ok(None),
        }
    }
}

impl PlanConfig {
    /// Planning options with flags taking precedence over the request.
    ///
    /// Departure and arrival times travel together: a timing flag replaces
    /// whatever timing the request file asked for.
    pub(crate) fn plan_options(&self, request: &RequestFile) -> Result<PlanOptions, CliError> {
        let options = PlanOptions::default()
            .with_strategy(self.strategy.or(request.strategy).unwrap_or_default())
            .with_route_type(self.route_type.or(request.route_type).unwrap_or_default())
            .with_batch(self.use_batch.or(request.use_batch).unwrap_or(false))
            .with_traffic(self.traffic.or(request.traffic).unwrap_or(false));
        let timing = match self.timing.clone() {
            Some(timing) => Some(timing),
            None => Timing::from_parts(request.depart_at.clone(), request.arrive_at.clone())?,
        };
        Ok(match timing {
            Some(Timing::DepartAt(time)) => options.with_depart_at(time),
            Some(Timing::ArriveAt(time)) => options.with_arrive_at(time),
            None => options,
        })
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;

        let mut optimizer = args
            .base_url
            .map_or_else(HttpRouteOptimizerConfig::default, HttpRouteOptimizerConfig::new);
        if let Some(api_key) = args.api_key {
            optimizer = optimizer.with_api_key(api_key);
        }
        if let Some(secs) = args.timeout_secs {
            optimizer = optimizer.with_timeout(Duration::from_secs(secs));
        }
        if let Some(limit) = args.max_concurrency {
            if limit == 0 {
                return Err(CliError::InvalidOption {
                    field: ARG_MAX_CONCURRENCY,
                    message: "must be at least 1".to_owned(),
                });
            }
            optimizer = optimizer.with_max_concurrency(limit);
        }

        Ok(Self {
            request_path,
            optimizer,
            strategy: parse_option(args.strategy.as_deref(), ARG_STRATEGY)?,
            route_type: parse_option(args.route_type.as_deref(), ARG_ROUTE_TYPE)?,
            use_batch: args.use_batch,
            traffic: args.traffic,
            timing: Timing::from_parts(args.depart_at, args.arrive_at)?,
            output: args.output,
        })
    }
}

/// Parse an optional named value, reporting failures against `field`.
pub(crate) fn parse_option<T>(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<T>, CliError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(str::parse)
        .transpose()
        .map_err(|message| CliError::InvalidOption { field, message })
}

/// Builds the routing service for a `plan` invocation.
pub(crate) trait OptimizerBuilder {
    /// Routing service produced by this builder.
    type Optimizer: RouteOptimizer;

    fn build(&self, config: &HttpRouteOptimizerConfig) -> Result<Self::Optimizer, CliError>;
}

/// Builds the HTTP routing client.
pub(crate) struct HttpOptimizerBuilder;

impl OptimizerBuilder for HttpOptimizerBuilder {
    type Optimizer = HttpRouteOptimizer;

    fn build(&self, config: &HttpRouteOptimizerConfig) -> Result<HttpRouteOptimizer, CliError> {
        HttpRouteOptimizer::with_config(config.clone()).map_err(|source| {
            CliError::BuildOptimizer {
                base_url: config.base_url.clone(),
                source,
            }
        })
    }
}

/// Caller-facing plan: the result plus the flat id lists callers show.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    #[serde(flatten)]
    result: &'a PlanResult,
    unassigned_student_ids: Vec<&'a str>,
    invalid_student_ids: Vec<&'a str>,
}

impl<'a> PlanReport<'a> {
    fn new(result: &'a PlanResult) -> Self {
        Self {
            result,
            unassigned_student_ids: result.unassigned_student_ids(),
            invalid_student_ids: result.invalid_student_ids(),
        }
    }
}

pub(crate) fn run_plan_with<B: OptimizerBuilder>(
    args: PlanArgs,
    builder: &B,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let request = load_request(&config.request_path)?;
    let options = config.plan_options(&request)?;
    let planner = FleetPlanner::new(builder.build(&config.optimizer)?);
    let result = planner.plan_fleet(&request.into_fleet_request(), &options);
    info!(
        "plan finished as {:?} with {} routes and {} unassigned students",
        result.status,
        result.routes.len(),
        result.unassigned.len()
    );
    if let Some(path) = &config.output {
        info!("writing plan to {path}");
    }
    emit_json(config.output.as_deref(), writer, &PlanReport::new(&result))
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    require_file(&config.request_path, ARG_REQUEST)?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
