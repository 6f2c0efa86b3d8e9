//! Initialize the configuration from the environment.
//!
//! Loading order:
//!
//! 1. The `SWARM_TRACKER_CONFIG` environment variable, holding the whole
//!    TOML document.
//! 2. The TOML file, `tracker.toml` by default, overridable with the
//!    `SWARM_TRACKER_PATH_CONFIG` environment variable or the `-f` CLI
//!    flag.
//! 3. The built-in defaults.
use std::env;

use swarm_tracker_configuration::{Configuration, Error, Info};

/// The whole configuration document in one environment variable.
pub const ENV_VAR_CONFIG: &str = "SWARM_TRACKER_CONFIG";

/// The configuration file path.
pub const ENV_VAR_PATH_CONFIG: &str = "SWARM_TRACKER_PATH_CONFIG";

/// The default path for the configuration file.
pub const DEFAULT_PATH_CONFIG: &str = "tracker.toml";

/// Loads the configuration from the environment.
///
/// # Errors
///
/// Will return `Err` if a present configuration source is malformed.
pub fn initialize_configuration(config_path_override: Option<&str>) -> Result<Configuration, Error> {
    let env_var_config = env::var(ENV_VAR_CONFIG).ok();

    let config_path = match config_path_override {
        Some(path) => path.to_owned(),
        None => env::var(ENV_VAR_PATH_CONFIG).unwrap_or_else(|_| DEFAULT_PATH_CONFIG.to_owned()),
    };

    Configuration::load(&Info::new(env_var_config, config_path))
}
