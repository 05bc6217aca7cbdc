//! Agora CLI binary.

use agora::cli::{args::*, commands::*};
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments using clap
    let args = AgoraArgs::parse();

    // Map verbosity to a default log filter; RUST_LOG wins when set.
    let default_filter = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
