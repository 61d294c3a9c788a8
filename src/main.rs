//! Certifying checker binary: verifies a model-checking witness against
//! its model and emits one combinational proof obligation per check.

use std::io::{self, Write};

use clap::Parser;

use certifaiger::options::CliOptions;

fn main() {
    let options = CliOptions::parse();
    if let Err(error) = initialize_logging(options.trace.to_level_filter()) {
        let _ = writeln!(io::stderr(), "Error: {error}");
        std::process::exit(5);
    }

    match certifaiger::run(
        &options.model,
        &options.witness,
        &options.checks,
        options.quantifier_caps(),
    ) {
        Ok(bitmask) => std::process::exit(bitmask),
        Err(error) => {
            let code = error.exit_code();
            let _ = writeln!(io::stderr(), "Error: {error}");
            std::process::exit(code);
        }
    }
}

/// Initializes the logging framework at the given trace level.
///
/// # Errors
///
/// Returns an error if the logging framework has already been initialized.
fn initialize_logging(level: log::LevelFilter) -> io::Result<()> {
    env_logger::builder()
        .filter(None, level)
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}
