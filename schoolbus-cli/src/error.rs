//! Error types emitted by the `schoolbus` CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use schoolbus_planner::PlanError;
use schoolbus_routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the `schoolbus` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it on the command line or set {env})")]
    MissingArgument {
        /// Name of the option involved.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// An option value could not be understood.
    #[error("invalid --{field}: {message}")]
    InvalidOption {
        /// Name of the option involved.
        field: &'static str,
        /// Human-readable explanation of the problem.
        message: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the option involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the option involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the option involved.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the request file failed.
    #[error("failed to open request at {path:?}: {source}")]
    OpenRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Request JSON could not be decoded.
    #[error("failed to parse request JSON at {path:?}: {source}")]
    ParseRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Constructing the routing client failed.
    #[error("failed to build routing client for {base_url:?}: {source}")]
    BuildOptimizer {
        /// Base URL of the routing service.
        base_url: String,
        /// Underlying error.
        #[source]
        source: ProviderBuildError,
    },
    /// Clustering refused the request.
    #[error("cannot preview clusters: {0}")]
    Preview(#[source] PlanError),
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
