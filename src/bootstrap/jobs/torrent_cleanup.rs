//! Job that runs the peer store sweep on a timer.
//!
//! The sweep advances every torrent's bucket ring (reclaiming peers that
//! stopped announcing) and collects torrents with no peers left.
use std::sync::Arc;
use std::time::Duration;

use swarm_tracker_configuration::Configuration;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core;

/// It starts a jobs for cleaning up the torrents data in the tracker.
///
/// The cleaning task is executed every `inactive_peer_cleanup_interval`
/// seconds.
#[must_use]
pub fn start_job(config: &Configuration, tracker: &Arc<core::Tracker>) -> JoinHandle<()> {
    let weak_tracker = std::sync::Arc::downgrade(tracker);
    let interval = config.inactive_peer_cleanup_interval;

    tokio::spawn(async move {
        let interval = Duration::from_secs(interval);
        let mut interval = tokio::time::interval(interval);

        // The first tick fires immediately; skip it.
        interval.tick().await;

        loop {
            interval.tick().await;

            if let Some(tracker) = weak_tracker.upgrade() {
                info!("Cleaning up torrents..");
                tracker.cleanup_torrents();
            } else {
                break;
            }
        }
    })
}
