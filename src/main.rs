use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod routes;

use errors::AppError;

fn main() -> ExitCode {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => err.report(),
    }
}

fn run() -> Result<(), AppError> {
    // --- Parse config + command ---
    let (cfg, command) = config::AppConfig::from_env_and_args()?;

    tracing::debug!("Starting bucket-tree with config: {:?}", cfg);

    // --- Run the command ---
    let reply = routes::routes::dispatch(&cfg, command)?;

    // --- Print the reply ---
    let out = if cfg.pretty {
        serde_json::to_string_pretty(&reply)
    } else {
        serde_json::to_string(&reply)
    }
    .map_err(|err| AppError::internal(format!("serializing reply: {}", err)))?;
    println!("{}", out);

    Ok(())
}
