//! menudispatch - drive menu open commands against an in-memory host.

use clap::Parser;
use std::process::ExitCode;

use menudispatch::{logging, Commands};

fn main() -> ExitCode {
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _guard = match logging::init() {
        Ok((guard, _)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Parse command line arguments
    let args = Commands::parse();

    // Run the command
    match args.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
