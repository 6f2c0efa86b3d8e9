//! Configuration data structures for the swarm tracker.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file
//! `tracker.toml` in the working directory or from the environment variable
//! `SWARM_TRACKER_CONFIG` with the same content as the file. The environment
//! variable takes precedence, which is useful when running the tracker in a
//! container or anywhere without persistent storage.
//!
//! Each TOML section is mapped to a data structure. Array sections like
//! `[[http_trackers]]` and `[[udp_trackers]]` allow binding more than one
//! listener of the same kind.
//!
//! The default configuration is:
//!
//! ```toml
//! announce_interval = 120
//! min_announce_interval = 120
//! mode = "public"
//! on_reverse_proxy = false
//! tracker_usage_statistics = true
//! inactive_peer_cleanup_interval = 600
//! remove_peerless_torrents = true
//! persistent_torrent_completed_stat = false
//!
//! [[udp_trackers]]
//! bind_address = "0.0.0.0:6969"
//! enabled = false
//!
//! [[http_trackers]]
//! bind_address = "0.0.0.0:7070"
//! enabled = false
//!
//! [livesync]
//! enabled = false
//! multicast_address = "224.0.23.5:9696"
//! flush_interval_ms = 1000
//! ```
use std::net::IpAddr;
use std::time::Duration;

use config::{Config, ConfigError, File, FileFormat};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use swarm_tracker_located_error::{Located, LocatedError};
use swarm_tracker_primitives::TrackerMode;
use thiserror::Error;

/// The maximum number of peer addresses returned in a single announce
/// response, whatever the client asked for.
pub const MAX_NUMWANT: usize = 200;

/// The number of peer addresses returned when the client does not say how
/// many it wants.
pub const DEFAULT_NUMWANT: usize = 50;

/// Timeout applied to every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Information required for loading config
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Build configuration info, reading the `SWARM_TRACKER_CONFIG`
    /// environment variable first and falling back to the TOML file path.
    #[must_use]
    pub fn new(env_var_config: Option<String>, config_toml_path: String) -> Self {
        Self {
            config_toml: env_var_config,
            config_toml_path,
        }
    }
}

/// Announce policy
#[derive(PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    ///
    /// It's a **recommended** wait time between announcements.
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more
    /// frequently than this.
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: 120,
            interval_min: 120,
        }
    }
}

/// Torrent-entry retention policy, consulted by the peer store sweep.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Constructor, Default)]
pub struct TrackerPolicy {
    /// Remove torrents with no peers left after the sweep.
    pub remove_peerless_torrents: bool,
    /// Keep entries whose completed-downloads counter was loaded from the
    /// saved-state file even when they have no peers.
    pub persistent_torrent_completed_stat: bool,
}

/// One HTTP tracker listener.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct HttpTracker {
    /// Weather the HTTP tracker is enabled or not.
    pub enabled: bool,
    /// The address the tracker will bind to, for example `0.0.0.0:7070`.
    pub bind_address: String,
}

/// One UDP tracker listener.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct UdpTracker {
    /// Weather the UDP tracker is enabled or not.
    pub enabled: bool,
    /// The address the tracker will bind to, for example `0.0.0.0:6969`.
    pub bind_address: String,
}

/// Live-sync: multicast replication of peer events between sibling
/// trackers in a cluster.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct LiveSync {
    /// Weather live-sync is enabled or not.
    pub enabled: bool,
    /// The multicast group and port, for example `224.0.23.5:9696`.
    pub multicast_address: String,
    /// How long records are buffered before a bundle is flushed, unless
    /// the MTU budget flushes it earlier.
    pub flush_interval_ms: u64,
}

impl Default for LiveSync {
    fn default() -> Self {
        Self {
            enabled: false,
            multicast_address: "224.0.23.5:9696".to_string(),
            flush_interval_ms: 1000,
        }
    }
}

/// Per-IP grants. An IP can appear in more than one list.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Access {
    /// IPs allowed to query `/stats` and the full scrape.
    pub stats: Vec<IpAddr>,
    /// IPs whose `X-Forwarded-For` header is trusted.
    pub proxy: Vec<IpAddr>,
    /// IPs accepted as live-sync cluster nodes.
    pub livesync: Vec<IpAddr>,
    /// IPs granted every permission.
    pub admin: Vec<IpAddr>,
}

/// Core configuration for the tracker.
#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Configuration {
    /// Logging level. Possible values are: `Off`, `Error`, `Warn`, `Info`,
    /// `Debug` and `Trace`. Default is `Info`.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Tracker mode. See [`TrackerMode`] for more information.
    pub mode: TrackerMode,

    /// Path to the access list file: one hex infohash per line, `#` starts
    /// a comment. Interpreted as a whitelist in `listed` mode and as a
    /// blacklist in `blacklisted` mode.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub accesslist_path: Option<String>,

    /// Path to the saved-state file loaded on a cold start. Text, one
    /// record per line: `<40 hex infohash>:<seeds hint>:<downloaded>`.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub state_file_path: Option<String>,

    /// Where `GET /` redirects to. Without it the root answers 404.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub redirect_url: Option<String>,

    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    pub announce_interval: u32,

    /// Minimum announce interval. Clients must not reannounce more
    /// frequently than this.
    pub min_announce_interval: u32,

    /// The external IP address of the tracker. Peers announcing from a
    /// loopback address are rewritten to this address in responses.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub external_ip: Option<String>,

    /// When enabled the client IP is taken from the `X-Forwarded-For`
    /// header instead of the connection address, but only for requests
    /// arriving from an IP with the proxy permission.
    pub on_reverse_proxy: bool,

    /// Weather the tracker keeps request statistics or not.
    pub tracker_usage_statistics: bool,

    /// Interval in seconds between peer store sweeps (bucket rotation and
    /// empty-torrent collection).
    pub inactive_peer_cleanup_interval: u64,

    /// Remove torrents with no peers during the sweep.
    pub remove_peerless_torrents: bool,

    /// Keep the completed-downloads counters of peerless torrents that
    /// were seeded from the saved-state file.
    pub persistent_torrent_completed_stat: bool,

    /// The list of UDP trackers the tracker is running.
    pub udp_trackers: Vec<UdpTracker>,

    /// The list of HTTP trackers the tracker is running.
    pub http_trackers: Vec<HttpTracker>,

    /// Live-sync cluster replication.
    #[serde(default)]
    pub livesync: LiveSync,

    /// Per-IP permission lists.
    #[serde(default)]
    pub access: Access,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: Some(String::from("info")),
            mode: TrackerMode::Public,
            accesslist_path: None,
            state_file_path: None,
            redirect_url: None,
            announce_interval: 120,
            min_announce_interval: 120,
            external_ip: None,
            on_reverse_proxy: false,
            tracker_usage_statistics: true,
            inactive_peer_cleanup_interval: 600,
            remove_peerless_torrents: true,
            persistent_torrent_completed_stat: false,
            udp_trackers: vec![UdpTracker {
                enabled: false,
                bind_address: String::from("0.0.0.0:6969"),
            }],
            http_trackers: vec![HttpTracker {
                enabled: false,
                bind_address: String::from("0.0.0.0:7070"),
            }],
            livesync: LiveSync::default(),
            access: Access::default(),
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Unable to load the configuration from the environment variable.
    /// This error only occurs if there is no configuration file and the
    /// `SWARM_TRACKER_CONFIG` environment variable is not set.
    #[error("Unable to load from Environmental Variable: {source}")]
    UnableToLoadFromEnvironmentVariable {
        source: LocatedError<'static, dyn std::error::Error + Send + Sync>,
    },

    /// Unable to load the configuration from the configuration file.
    #[error("Failed processing the configuration: {source}")]
    ConfigError { source: LocatedError<'static, ConfigError> },
}

impl From<ConfigError> for Error {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        Self::ConfigError {
            source: Located(err).into(),
        }
    }
}

impl Configuration {
    /// Returns the tracker external IP, if configured and valid.
    #[must_use]
    pub fn get_ext_ip(&self) -> Option<IpAddr> {
        self.external_ip.as_ref().and_then(|ip| ip.parse::<IpAddr>().ok())
    }

    /// Loads the configuration from the `Info` struct: the environment
    /// variable content when present, the TOML file otherwise, and the
    /// defaults when neither exists.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration is present but malformed.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        if let Some(config_toml) = &info.config_toml {
            return Self::load_from_str(config_toml);
        }

        if std::path::Path::new(&info.config_toml_path).exists() {
            return Self::load_from_file(&info.config_toml_path);
        }

        Ok(Configuration::default())
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file cannot be read or is malformed.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let config = Config::builder()
            .add_source(File::new(path, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Loads the configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the string is not well-formed TOML.
    pub fn load_from_str(config_toml: &str) -> Result<Configuration, Error> {
        let config = Config::builder()
            .add_source(File::from_str(config_toml, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Panics
    ///
    /// Will panic if the configuration cannot be serialized, which cannot
    /// happen for a value that deserialized successfully.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string(self).expect("Could not encode TOML value")
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        AnnouncePolicy::new(self.announce_interval, self.min_announce_interval)
    }

    #[must_use]
    pub fn get_tracker_policy(&self) -> TrackerPolicy {
        TrackerPolicy::new(self.remove_peerless_torrents, self.persistent_torrent_completed_stat)
    }
}

#[cfg(test)]
mod tests {
    use crate::Configuration;

    #[test]
    fn configuration_should_have_default_values() {
        let configuration = Configuration::default();

        let toml = configuration.to_toml();

        assert!(toml.contains("announce_interval = 120"));
        assert!(toml.contains("mode = \"public\""));
    }

    #[test]
    fn configuration_should_contain_the_external_ip() {
        let configuration = Configuration {
            external_ip: Some(String::from("126.0.0.1")),
            ..Default::default()
        };

        assert_eq!(
            configuration.get_ext_ip(),
            Some("126.0.0.1".parse::<std::net::IpAddr>().unwrap())
        );
    }

    #[test]
    fn configuration_should_be_loaded_from_a_toml_config_string() {
        let config_toml = r#"
            mode = "listed"
            accesslist_path = "./whitelist.txt"
            announce_interval = 1800
            min_announce_interval = 900
            on_reverse_proxy = false
            tracker_usage_statistics = true
            inactive_peer_cleanup_interval = 600
            remove_peerless_torrents = true
            persistent_torrent_completed_stat = false

            [[udp_trackers]]
            enabled = true
            bind_address = "0.0.0.0:6969"

            [[http_trackers]]
            enabled = true
            bind_address = "0.0.0.0:7070"

            [livesync]
            enabled = false
            multicast_address = "224.0.23.5:9696"
            flush_interval_ms = 1000

            [access]
            stats = ["127.0.0.1"]
            proxy = []
            livesync = []
            admin = []
        "#
        .to_string();

        let configuration = Configuration::load_from_str(&config_toml).expect("Could not load configuration from file");

        assert_eq!(configuration.mode, swarm_tracker_primitives::TrackerMode::Listed);
        assert_eq!(configuration.accesslist_path, Some("./whitelist.txt".to_string()));
        assert_eq!(configuration.announce_interval, 1800);
        assert!(configuration.udp_trackers[0].enabled);
    }

    #[test]
    fn default_configuration_should_be_loaded_when_there_is_no_file_and_no_env_var() {
        let info = crate::Info::new(None, "/tmp/this-file-does-not-exist.toml".to_string());

        let configuration = Configuration::load(&info).expect("Could not load configuration");

        assert_eq!(configuration, Configuration::default());
    }
}
