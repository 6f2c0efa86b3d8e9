//! Tracker domain services. Core tracker services:
//!
//! - The tracker factory, assembling a [`Tracker`] from the configuration.
//! - [Statistics](crate::core::services::statistics) snapshots.
//! - [Torrent](crate::core::services::torrent) queries (full scrape).
pub mod statistics;
pub mod torrent;

use swarm_tracker_configuration::Configuration;

use crate::core::Tracker;

/// It returns a new tracker building its dependencies.
///
/// The live-sync hook is not wired here; it needs a socket-owning task and
/// is added by the bootstrap when live-sync is enabled.
#[must_use]
pub fn tracker_factory(config: &Configuration) -> Tracker {
    // the tracker statistics
    let (stats_event_sender, stats_repository) = statistics::setup::factory(config.tracker_usage_statistics);

    Tracker::new(config, stats_event_sender, stats_repository, None)
}
