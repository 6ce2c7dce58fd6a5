pub mod cli;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod protocol;
pub mod server;

pub use cli::Cli;
