//! Entry point for the `schoolbus` command.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use schoolbus_cli::CliError;

#[expect(clippy::print_stderr, reason = "fatal errors are reported on stderr")]
fn main() -> ExitCode {
    if let Err(err) = schoolbus_cli::init_logger() {
        eprintln!("schoolbus: failed to install logger: {err}");
    }
    match schoolbus_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Clap renders help, version and usage errors itself.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("schoolbus: {err}");
            ExitCode::FAILURE
        }
    }
}
