//! Logger installation for the `schoolbus` binary.
//!
//! Library crates only talk to the `log` facade; the binary decides where
//! records go. Everything goes to stderr so stdout carries nothing but JSON.

use std::io::{self, Write};

use env_logger::{Builder, Env, Target, WriteStyle};

/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Filter used when [`LOG_FILTER_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global logger.
///
/// # Errors
///
/// Fails when another logger has already been installed.
pub fn init_logger() -> io::Result<()> {
    builder(Env::new().filter_or(LOG_FILTER_ENV, DEFAULT_LOG_FILTER))
        .try_init()
        .map_err(io::Error::other)
}

fn builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder
        .target(Target::Stderr)
        .write_style(WriteStyle::Never)
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} [{}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    builder
}
