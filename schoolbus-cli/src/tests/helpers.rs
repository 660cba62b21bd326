//! Test helpers for writing request files into scratch directories.

use camino::{Utf8Path, Utf8PathBuf};
use schoolbus_core::{Bus, OptimizeError, Point, Student};
use schoolbus_core::test_support::FailingOptimizer;
use schoolbus_routing::HttpRouteOptimizerConfig;
use tempfile::TempDir;

use crate::CliError;
use crate::plan::OptimizerBuilder;
use crate::request::RequestFile;

/// A temporary directory that lives as long as the value.
#[derive(Debug)]
pub(super) struct Scratch {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
}

impl Scratch {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

pub(super) fn write_request(path: &Utf8Path, request: &RequestFile) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

/// Four students around a school in Athens plus one without coordinates,
/// and two buses with two seats each.
pub(super) fn sample_request() -> RequestFile {
    RequestFile {
        school: Point::new("school", 37.98, 23.73),
        students: vec![
            Student::new("north-near", 37.985, 23.73),
            Student::new("north-far", 37.995, 23.731),
            Student::new("south-near", 37.975, 23.73),
            Student::new("south-far", 37.965, 23.729),
            Student::without_location("nowhere"),
        ],
        buses: vec![Bus::new("b1", 2), Bus::new("b2", 2)],
        ..RequestFile::default()
    }
}

/// Builds in-process straight-line optimizers instead of HTTP clients,
/// optionally failing every request for one bus.
#[derive(Debug, Default)]
pub(super) struct StubOptimizerBuilder {
    pub(super) failing_bus: Option<String>,
}

impl OptimizerBuilder for StubOptimizerBuilder {
    type Optimizer = FailingOptimizer;

    fn build(&self, _config: &HttpRouteOptimizerConfig) -> Result<FailingOptimizer, CliError> {
        let failing: Vec<String> = self.failing_bus.iter().cloned().collect();
        Ok(FailingOptimizer::for_buses(
            failing,
            OptimizeError::NetworkError {
                url: "http://routing.invalid".to_owned(),
                message: "connection refused".to_owned(),
            },
        ))
    }
}
