//! The `announce` service.
//!
//! The service is responsible for handling the `announce` requests.
//!
//! It delegates the `announce` logic to the [`Tracker`](crate::core::Tracker)
//! and it sends the [`statistics::Event`](crate::core::statistics::Event)
//! events related to the `announce` request.
use std::net::IpAddr;
use std::sync::Arc;

use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;

use crate::core::{statistics, AnnounceData, Tracker};

/// The HTTP tracker `announce` service.
///
/// The service sends an statistics event that increments:
///
/// - The number of TCP connections handled by the HTTP tracker.
/// - The number of TCP `announce` requests handled by the HTTP tracker.
///
/// > **NOTICE**: as the HTTP tracker does not have an specific `connection`
/// > request like the UDP tracker, the number of TCP connections is
/// > increased for every `announce` request.
pub async fn invoke(
    tracker: Arc<Tracker>,
    info_hash: InfoHash,
    peer: &mut peer::Peer,
    peers_wanted: usize,
) -> AnnounceData {
    let original_peer_ip = peer.peer_addr.ip();

    // The tracker could change the original peer ip
    let announce_data = tracker.announce(&info_hash, peer, &original_peer_ip, peers_wanted).await;

    match original_peer_ip {
        IpAddr::V4(_) => {
            tracker.send_stats_event(statistics::Event::Tcp4Announce).await;
        }
        IpAddr::V6(_) => {
            tracker.send_stats_event(statistics::Event::Tcp6Announce).await;
        }
    }

    announce_data
}
