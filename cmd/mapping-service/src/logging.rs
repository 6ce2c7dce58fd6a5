use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::{debug_enabled, DEBUG_ENV};

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. `RUST_LOG` wins when set; otherwise the
/// `DEBUG` flag picks between debug and info.
pub fn init() -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to set up LogTracer")?;

    let debug = debug_enabled(std::env::var(DEBUG_ENV).ok().as_deref());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    Ok(())
}
