use std::net::SocketAddr;

use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::peer::{self};
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::DurationSinceUnixEpoch;

use super::Entry;
use crate::EntrySingle;

impl Entry for EntrySingle {
    #[allow(clippy::cast_possible_truncation)]
    fn get_swarm_metadata(&self) -> SwarmMetadata {
        let (seeders, leechers) = self.peers.seeders_and_leechers();

        SwarmMetadata {
            downloaded: self.downloaded.min(u64::from(u32::MAX)) as u32,
            complete: seeders as u32,
            incomplete: leechers as u32,
        }
    }

    fn is_good(&self, policy: &TrackerPolicy) -> bool {
        if policy.persistent_torrent_completed_stat && self.downloaded > 0 {
            return true;
        }

        if policy.remove_peerless_torrents && self.peers.is_empty() {
            return false;
        }

        true
    }

    fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn get_peers_len(&self) -> usize {
        self.peers.len()
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<peer::Peer> {
        match limit {
            Some(limit) => self.peers.iter().copied().choose_multiple(&mut SmallRng::from_entropy(), limit),
            None => self.peers.iter().copied().collect(),
        }
    }

    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<peer::Peer> {
        // Take peers which are not the client peer
        let candidates = self.peers.iter().filter(|peer| peer.peer_addr != *client).copied();

        match limit {
            Some(limit) => candidates.choose_multiple(&mut SmallRng::from_entropy(), limit),
            None => candidates.collect(),
        }
    }

    fn upsert_peer(&mut self, peer: &peer::Peer) -> bool {
        let mut downloaded_stats_updated: bool = false;

        self.peers.rotate(peer::ReadInfo::get_updated(peer));

        match peer::ReadInfo::get_event(peer) {
            AnnounceEvent::Stopped => {
                drop(self.peers.remove(&peer::ReadInfo::get_address(peer)));
            }
            AnnounceEvent::Completed => {
                let previous = self.peers.upsert(*peer);
                // Don't count if peer was not previously known or had already completed.
                if previous.is_some_and(|p| p.event != AnnounceEvent::Completed) {
                    self.downloaded = self.downloaded.saturating_add(1);
                    downloaded_stats_updated = true;
                }
            }
            _ => {
                drop(self.peers.upsert(*peer));
            }
        }

        downloaded_stats_updated
    }

    fn rotate_buckets(&mut self, now: DurationSinceUnixEpoch) {
        self.peers.rotate(now);
    }
}
