//! The JSON request file shared by `plan` and `preview`.

use std::io::Write;

use camino::Utf8Path;
use schoolbus_core::{Bus, Point, RouteType, Stop, StrategyKind, Student};
use schoolbus_fs::{create_utf8_file, file_is_file, read_utf8_file};
use schoolbus_planner::FleetRequest;
use serde::{Deserialize, Serialize};

use crate::CliError;

/// Everything a caller sends to plan one school's fleet.
///
/// Only `school` is required. Planning choices given here are overridden by
/// the matching command-line flags.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub(crate) struct RequestFile {
    pub(crate) school: Point,
    #[serde(default)]
    pub(crate) students: Vec<Student>,
    #[serde(default)]
    pub(crate) buses: Vec<Bus>,
    #[serde(default)]
    pub(crate) stops: Vec<Stop>,
    #[serde(default)]
    pub(crate) strategy: Option<StrategyKind>,
    #[serde(default)]
    pub(crate) use_batch: Option<bool>,
    #[serde(default)]
    pub(crate) route_type: Option<RouteType>,
    #[serde(default)]
    pub(crate) traffic: Option<bool>,
    #[serde(default)]
    pub(crate) depart_at: Option<String>,
    #[serde(default)]
    pub(crate) arrive_at: Option<String>,
}

impl RequestFile {
    pub(crate) fn into_fleet_request(self) -> FleetRequest {
        FleetRequest::new(self.school, self.students, self.buses).with_stops(self.stops)
    }
}

/// Loads a JSON-encoded [`RequestFile`] from disk.
pub(crate) fn load_request(path: &Utf8Path) -> Result<RequestFile, CliError> {
    let contents = read_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Pretty-print `value` as JSON to `output` when given, otherwise to
/// `writer`.
pub(crate) fn emit_json<T: Serialize>(
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    payload.push('\n');
    match output {
        Some(path) => {
            let mut file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
                path: path.to_path_buf(),
                source,
            })?;
            file.write_all(payload.as_bytes())
                .map_err(CliError::WriteOutput)
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}
