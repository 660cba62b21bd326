//! Command-line interface for the school bus planning engine.
//!
//! `schoolbus plan` clusters a request's students onto its buses and asks a
//! routing service for each bus's stop order. `schoolbus preview` only runs
//! the clustering step, which is handy for trying strategies offline.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod logging;
mod plan;
mod preview;
mod request;

pub use error::CliError;
pub use logging::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, init_logger};

use plan::{HttpOptimizerBuilder, PlanArgs, run_plan_with};
use preview::{PreviewArgs, run_preview_with};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_MAX_CONCURRENCY: &str = "max-concurrency";
pub(crate) const ARG_STRATEGY: &str = "strategy";
pub(crate) const ARG_ROUTE_TYPE: &str = "route-type";
pub(crate) const ARG_USE_BATCH: &str = "use-batch";
pub(crate) const ARG_TRAFFIC: &str = "traffic";
pub(crate) const ARG_DEPART_AT: &str = "depart-at";
pub(crate) const ARG_ARRIVE_AT: &str = "arrive-at";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_PLAN_REQUEST: &str = "SCHOOLBUS_CMDS_PLAN_REQUEST_PATH";
pub(crate) const ENV_PREVIEW_REQUEST: &str = "SCHOOLBUS_CMDS_PREVIEW_REQUEST_PATH";

/// Run the CLI with the current process arguments and environment,
/// writing results to stdout.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli, &mut stdout)
}

fn dispatch(cli: Cli, writer: &mut dyn Write) -> Result<(), CliError> {
    match cli.command {
        Command::Plan(args) => run_plan_with(args, &HttpOptimizerBuilder, writer),
        Command::Preview(args) => run_preview_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "schoolbus",
    about = "Assign students to school buses and plan their routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster students onto buses and optimise every route.
    Plan(PlanArgs),
    /// Show how students would be grouped, without routing.
    Preview(PreviewArgs),
}

#[cfg(test)]
mod tests;
