//! Parley - chat commands and a discussion-topic queue.
//!
//! This is the main entry point for the bot binary.

use clap::Parser;
use std::process::ExitCode;

use parley::cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Commands::parse();

    // Initialize logging; the guard flushes the log file on drop
    let _guard = match args.init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Run the command
    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
