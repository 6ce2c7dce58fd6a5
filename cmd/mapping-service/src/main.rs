use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = mapping_service::logging::init() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
    let cli = mapping_service::Cli::parse();

    tracing::debug!(state_dir = %cli.state_dir.display(), "Starting volume plugin");
    if let Err(e) = mapping_service::server::run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
