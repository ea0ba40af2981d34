// src/main.rs
use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use referendum::{config::Config, init_tracing, start_server};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    let dotenv_loaded = dotenv().is_ok();
    init_tracing();
    if !dotenv_loaded {
        info!("No .env file found");
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = start_server(config).await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
