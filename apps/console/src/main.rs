//! # Optica Console Entry Point
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Initialize tracing (logging)
//! 3. Load `ConsoleConfig` (defaults → TOML → environment)
//! 4. Run the command against the REST backend
//! 5. Print the result, or the error as `[CODE] message`

use std::process::ExitCode;

use clap::Parser;
use optica_console::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    // The actual setup is in lib.rs for better testability
    match optica_console::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                eprintln!("{}", serde_json::to_string(&err).unwrap_or_else(|_| err.to_string()));
            } else {
                eprintln!("{}", err);
            }
            ExitCode::FAILURE
        }
    }
}
