//! Command-line entry point for the layered configuration resolver.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use strata::constants;
use strata::env::Env;

fn main() {
    init_tracing();

    match cli::run(std::env::args_os(), &Env::real()) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            process::exit(1);
        }
    }
}

/// Log to stderr so stdout carries nothing but the command output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(constants::ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
