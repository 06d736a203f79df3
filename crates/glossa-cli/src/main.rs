#![forbid(unsafe_code)]

//! Command-line front end for the `glossa` localization engine.
//!
//! Loads a locale tree, prints requested lookups, and reports audit
//! results. Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=glossa=debug`).

mod cli;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli::run_from_env() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
