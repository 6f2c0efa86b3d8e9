//! The `scrape` services.
//!
//! There are two:
//!
//! - [`invoke`]: the regular scrape over a list of infohashes.
//! - [`invoke_full_scrape`]: the full scrape over every torrent the
//!   tracker knows, assembled shard by shard off the hot path.
//!
//! Both delegate to the [`Tracker`](crate::core::Tracker) and send the
//! [`statistics::Event`](crate::core::statistics::Event) events related to
//! the request.
use std::net::IpAddr;
use std::sync::Arc;

use swarm_tracker_primitives::info_hash::InfoHash;

use crate::core::services::torrent::get_all_swarm_metadata;
use crate::core::{statistics, ScrapeData, Tracker};

/// The HTTP tracker `scrape` service.
///
/// The service sends an statistics event that increments:
///
/// - The number of TCP connections handled by the HTTP tracker.
/// - The number of TCP `scrape` requests handled by the HTTP tracker.
pub async fn invoke(tracker: Arc<Tracker>, info_hashes: &Vec<InfoHash>, original_peer_ip: &IpAddr) -> ScrapeData {
    let scrape_data = tracker.scrape(info_hashes).await;

    send_scrape_event(&tracker, original_peer_ip).await;

    scrape_data
}

/// The HTTP tracker full-scrape service: metadata for every torrent.
///
/// On top of the regular scrape events it counts the full scrape itself,
/// since each one walks the whole store.
pub async fn invoke_full_scrape(tracker: Arc<Tracker>, original_peer_ip: &IpAddr) -> ScrapeData {
    let mut scrape_data = ScrapeData::empty();

    for (info_hash, swarm_metadata) in get_all_swarm_metadata(&tracker).await {
        scrape_data.add_file(&info_hash, swarm_metadata);
    }

    tracker.send_stats_event(statistics::Event::Fullscrape).await;

    send_scrape_event(&tracker, original_peer_ip).await;

    scrape_data
}

async fn send_scrape_event(tracker: &Arc<Tracker>, original_peer_ip: &IpAddr) {
    match original_peer_ip {
        IpAddr::V4(_) => {
            tracker.send_stats_event(statistics::Event::Tcp4Scrape).await;
        }
        IpAddr::V6(_) => {
            tracker.send_stats_event(statistics::Event::Tcp6Scrape).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use mockall::predicate::eq;
    use swarm_tracker_primitives::info_hash::InfoHash;
    use swarm_tracker_test_helpers::configuration;

    use crate::core::services::statistics::setup::factory;
    use crate::core::statistics::MockEventSender;
    use crate::core::{statistics, ScrapeData, Tracker};
    use crate::servers::http::v1::services::scrape::invoke;

    fn sample_info_hash() -> InfoHash {
        "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()
    }

    fn tracker_with_stats_event_sender(stats_event_sender: Box<dyn statistics::EventSender>) -> Tracker {
        let (_, stats_repository) = factory(false);

        Tracker::new(
            &configuration::ephemeral(),
            Some(stats_event_sender),
            stats_repository,
            None,
        )
    }

    #[tokio::test]
    async fn it_should_send_the_tcp_4_scrape_event_when_the_peer_uses_ipv4() {
        let mut stats_event_sender_mock = MockEventSender::new();
        stats_event_sender_mock
            .expect_send_event()
            .with(eq(statistics::Event::Tcp4Scrape))
            .times(1)
            .returning(|_| Box::pin(std::future::ready(Some(Ok(())))));

        let tracker = Arc::new(tracker_with_stats_event_sender(Box::new(stats_event_sender_mock)));

        let scrape_data = invoke(
            tracker,
            &vec![sample_info_hash()],
            &IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)),
        )
        .await;

        let mut expected_scrape_data = ScrapeData::empty();
        expected_scrape_data.add_file_with_zeroed_metadata(&sample_info_hash());

        assert_eq!(scrape_data, expected_scrape_data);
    }
}
