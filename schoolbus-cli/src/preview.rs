//! `preview` command: show the clustering a plan would start from.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::warn;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use schoolbus_core::{Clustering, StrategyKind};
use schoolbus_planner::{ClusterPreview, PlannerConfig, preview_clusters};
use serde::{Deserialize, Serialize};

use crate::plan::parse_option;
use crate::request::{emit_json, load_request, require_file};
use crate::{ARG_OUTPUT, ARG_REQUEST, ARG_STRATEGY, CliError, ENV_PREVIEW_REQUEST};

/// CLI arguments for the `preview` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Group a request's students onto its buses with a \
                 clustering strategy and print the clusters. No routing \
                 service is contacted.",
    about = "Preview the clusters for a request"
)]
#[ortho_config(prefix = "SCHOOLBUS")]
pub(crate) struct PreviewArgs {
    /// Path to a JSON request file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Clustering strategy (sweep, balanced, kmeans, grid, density).
    #[arg(long = ARG_STRATEGY, value_name = "name")]
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    /// Write the clusters to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

/// Resolved `preview` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreviewConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) strategy: Option<StrategyKind>,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<PreviewArgs> for PreviewConfig {
    type Error = CliError;

    fn try_from(args: PreviewArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_PREVIEW_REQUEST,
        })?;
        Ok(Self {
            request_path,
            strategy: parse_option(args.strategy.as_deref(), ARG_STRATEGY)?,
            output: args.output,
        })
    }
}

/// JSON shape printed by `preview`: the clustering plus the students that
/// were left out for bad coordinates.
#[derive(Debug, Serialize)]
struct PreviewReport<'a> {
    #[serde(flatten)]
    clustering: &'a Clustering,
    invalid_student_ids: &'a [String],
}

impl<'a> From<&'a ClusterPreview> for PreviewReport<'a> {
    fn from(preview: &'a ClusterPreview) -> Self {
        Self {
            clustering: &preview.clustering,
            invalid_student_ids: &preview.invalid_student_ids,
        }
    }
}

pub(crate) fn run_preview_with(args: PreviewArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = PreviewConfig::try_from(merged)?;
    require_file(&config.request_path, ARG_REQUEST)?;

    let request = load_request(&config.request_path)?;
    let strategy = config.strategy.or(request.strategy).unwrap_or_default();
    let preview = preview_clusters(
        &PlannerConfig::default(),
        &request.school,
        &request.students,
        &request.buses,
        strategy,
    )
    .map_err(CliError::Preview)?;
    if !preview.invalid_student_ids.is_empty() {
        warn!(
            "{} students left out of the preview for bad coordinates",
            preview.invalid_student_ids.len()
        );
    }
    emit_json(config.output.as_deref(), writer, &PreviewReport::from(&preview))
}
