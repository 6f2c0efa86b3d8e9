//! Statistics services.
//!
//! It includes:
//!
//! - A [`factory`](crate::core::services::statistics::setup::factory) function to build the statistics infrastructure.
//! - A [`get_metrics`] service to get the tracker [`metrics`](crate::core::statistics::Metrics).
pub mod setup;

use std::sync::Arc;

use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;

use crate::core::statistics::Metrics;
use crate::core::Tracker;

/// All the metrics collected by the tracker.
#[derive(Debug, PartialEq, Eq)]
pub struct TrackerMetrics {
    /// Swarm aggregates: total torrents, seeders, leechers, completed.
    pub torrents_metrics: TorrentsMetrics,

    /// Request counters.
    pub protocol_metrics: Metrics,
}

/// It returns all the [`TrackerMetrics`]. The swarm aggregates walk every
/// shard, so this belongs on stats endpoints, not on the announce path.
pub async fn get_metrics(tracker: Arc<Tracker>) -> TrackerMetrics {
    let torrents_metrics = tracker.get_torrents_metrics();
    let stats = tracker.get_stats().await;

    TrackerMetrics {
        torrents_metrics,
        protocol_metrics: Metrics {
            tcp4_connections_handled: stats.tcp4_connections_handled,
            tcp4_announces_handled: stats.tcp4_announces_handled,
            tcp4_scrapes_handled: stats.tcp4_scrapes_handled,
            tcp6_connections_handled: stats.tcp6_connections_handled,
            tcp6_announces_handled: stats.tcp6_announces_handled,
            tcp6_scrapes_handled: stats.tcp6_scrapes_handled,
            udp4_connections_handled: stats.udp4_connections_handled,
            udp4_announces_handled: stats.udp4_announces_handled,
            udp4_scrapes_handled: stats.udp4_scrapes_handled,
            udp6_connections_handled: stats.udp6_connections_handled,
            udp6_announces_handled: stats.udp6_announces_handled,
            udp6_scrapes_handled: stats.udp6_scrapes_handled,
            fullscrapes_handled: stats.fullscrapes_handled,
            accesslist_denied_requests: stats.accesslist_denied_requests,
            accesslist_lines_skipped: stats.accesslist_lines_skipped,
            udp_connection_id_mismatches: stats.udp_connection_id_mismatches,
            livesync_records_sent: stats.livesync_records_sent,
            livesync_records_received: stats.livesync_records_received,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
    use swarm_tracker_test_helpers::configuration;

    use crate::core::services::statistics::{get_metrics, TrackerMetrics};
    use crate::core::services::tracker_factory;
    use crate::core::statistics::Metrics;

    #[tokio::test]
    async fn the_statistics_service_should_return_the_tracker_metrics() {
        let tracker = Arc::new(tracker_factory(&configuration::ephemeral()));

        let tracker_metrics = get_metrics(tracker.clone()).await;

        assert_eq!(
            tracker_metrics,
            TrackerMetrics {
                torrents_metrics: TorrentsMetrics::default(),
                protocol_metrics: Metrics::default(),
            }
        );
    }
}
