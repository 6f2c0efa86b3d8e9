//! Setup for the application logging.
//!
//! The log level is taken from the configuration (`off`, `error`, `warn`,
//! `info`, `debug`, `trace`), defaulting to `info`.
use std::str::FromStr;
use std::sync::Once;

use swarm_tracker_configuration::Configuration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

static INIT: Once = Once::new();

/// It redirects the log info to the standard output with the log level in
/// the configuration.
pub fn setup(cfg: &Configuration) {
    let level = config_level_or_default(cfg.log_level.as_deref());

    if level == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        stdout_init(level);
    });
}

fn config_level_or_default(log_level: Option<&str>) -> LevelFilter {
    match log_level {
        None => LevelFilter::INFO,
        Some(level) => LevelFilter::from_str(level).unwrap_or(LevelFilter::INFO),
    }
}

fn stdout_init(filter: LevelFilter) {
    tracing_subscriber::fmt().with_max_level(filter).init();

    info!("logging initialized.");
}
