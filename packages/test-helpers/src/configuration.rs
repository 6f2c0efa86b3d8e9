//! Tracker configuration factories for testing.
use std::net::IpAddr;

use swarm_tracker_configuration::Configuration;
use swarm_tracker_primitives::TrackerMode;

/// This configuration is used for testing. All the listeners are bound to
/// port 0 (ephemeral ports) so tests running in parallel do not collide.
///
/// > **NOTICE**: This configuration is not meant to be used in production.
///
/// > **NOTICE**: You can change the log level to `debug` to see the output
/// > of the tracker while running the tests. That can be particularly
/// > useful when debugging tests.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration {
        log_level: Some(String::from("off")), // Change to `debug` for tests debugging
        ..Default::default()
    };

    // Ephemeral socket address for the UDP tracker
    config.udp_trackers[0].enabled = true;
    config.udp_trackers[0].bind_address = String::from("127.0.0.1:0");

    // Ephemeral socket address for the HTTP tracker
    config.http_trackers[0].enabled = true;
    config.http_trackers[0].bind_address = String::from("127.0.0.1:0");

    config
}

/// Ephemeral configuration with reverse proxy enabled.
#[must_use]
pub fn ephemeral_with_reverse_proxy() -> Configuration {
    let mut cfg = ephemeral();

    cfg.on_reverse_proxy = true;
    cfg.access.proxy = vec!["127.0.0.1".parse().unwrap()];

    cfg
}

/// Ephemeral configuration with reverse proxy disabled.
#[must_use]
pub fn ephemeral_without_reverse_proxy() -> Configuration {
    let mut cfg = ephemeral();

    cfg.on_reverse_proxy = false;

    cfg
}

/// Ephemeral configuration with `public` mode.
#[must_use]
pub fn ephemeral_mode_public() -> Configuration {
    let mut cfg = ephemeral();

    cfg.mode = TrackerMode::Public;

    cfg
}

/// Ephemeral configuration with `listed` (whitelist) mode.
#[must_use]
pub fn ephemeral_mode_whitelisted() -> Configuration {
    let mut cfg = ephemeral();

    cfg.mode = TrackerMode::Listed;

    cfg
}

/// Ephemeral configuration with `blacklisted` mode.
#[must_use]
pub fn ephemeral_mode_blacklisted() -> Configuration {
    let mut cfg = ephemeral();

    cfg.mode = TrackerMode::Blacklisted;

    cfg
}

/// Ephemeral configuration with a custom external (public) IP for the tracker.
#[must_use]
pub fn ephemeral_with_external_ip(ip: IpAddr) -> Configuration {
    let mut cfg = ephemeral();

    cfg.external_ip = Some(ip.to_string());

    cfg
}

/// Ephemeral configuration granting the stats permission to localhost.
#[must_use]
pub fn ephemeral_with_stats_access_for_localhost() -> Configuration {
    let mut cfg = ephemeral();

    cfg.access.stats = vec!["127.0.0.1".parse().unwrap(), "::1".parse().unwrap()];

    cfg
}

/// Ephemeral configuration without running any services.
#[must_use]
pub fn ephemeral_with_no_services() -> Configuration {
    let mut cfg = ephemeral();

    cfg.http_trackers[0].enabled = false;
    cfg.udp_trackers[0].enabled = false;

    cfg
}
