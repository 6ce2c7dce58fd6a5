use clap::Parser;
use std::path::PathBuf;

use crate::config::{SOCKET_ADDRESS, STATE_DIR};

#[derive(Debug, Parser)]
#[command(name = "mapping-service")]
#[command(about = "Volume plugin mapping volume names to existing host directories", long_about = None)]
pub struct Cli {
    /// Directory holding the persisted name to mountpoint table
    #[arg(long, value_name = "DIR", default_value = STATE_DIR)]
    pub state_dir: PathBuf,

    /// Unix socket the plugin API is served on
    #[arg(long, value_name = "PATH", default_value = SOCKET_ADDRESS)]
    pub socket: PathBuf,
}
