//! Tracing setup.
//!
//! Grounded in `examples/bartolli-codanna/src/logging.rs`: a `tracing-subscriber`
//! `EnvFilter` built from configuration, overridden wholesale if `RUST_LOG`
//! is set in the environment.

use std::fmt;
use std::sync::Once;

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// `HH:MM:SS.mmm` local time, compact enough for a CLI's stderr output.
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Build the effective filter directive string: `RUST_LOG` always wins if
/// present, otherwise fall back to the configured default level.
fn effective_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&config.level)
    }
}

pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(effective_filter(config))
            .with_timer(CompactTime)
            .with_target(false)
            .init();
    });
}

pub fn init() {
    init_with_config(&LoggingConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_warn_level() {
        assert_eq!(LoggingConfig::default().level, "warn");
    }
}
