mod cli;
mod config;
mod errors;
mod pipeline;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // .env is optional; a present but broken file is reported, not fatal.
    let env_loaded = dotenvy::dotenv()
        .map(|_| ())
        .or_else(|e| if e.not_found() { Ok(()) } else { Err(e) });

    telemetry::init();
    if let Err(e) = env_loaded {
        warn!(error = %e, "could not load .env");
    }

    match pipeline::start(&cli, |key| std::env::var(key).ok()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
