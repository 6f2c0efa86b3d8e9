use std::net::SocketAddr;

use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch};

use super::{Entry, EntrySync};
use crate::{EntryMutexStd, EntrySingle};

impl EntrySync for EntryMutexStd {
    fn get_swarm_metadata(&self) -> SwarmMetadata {
        self.lock().expect("it should get a lock").get_swarm_metadata()
    }

    fn is_good(&self, policy: &TrackerPolicy) -> bool {
        self.lock().expect("it should get a lock").is_good(policy)
    }

    fn peers_is_empty(&self) -> bool {
        self.lock().expect("it should get a lock").peers_is_empty()
    }

    fn get_peers_len(&self) -> usize {
        self.lock().expect("it should get a lock").get_peers_len()
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<peer::Peer> {
        self.lock().expect("it should get lock").get_peers(limit)
    }

    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<peer::Peer> {
        self.lock().expect("it should get lock").get_peers_for_client(client, limit)
    }

    fn upsert_peer(&self, peer: &peer::Peer) -> bool {
        self.lock().expect("it should lock the entry").upsert_peer(peer)
    }

    fn upsert_peer_and_get_stats(&self, peer: &peer::Peer) -> (bool, SwarmMetadata) {
        let mut entry = self.lock().expect("it should lock the entry");

        let stats_updated = entry.upsert_peer(peer);

        (stats_updated, entry.get_swarm_metadata())
    }

    fn rotate_buckets(&self, now: DurationSinceUnixEpoch) {
        self.lock().expect("it should lock the entry").rotate_buckets(now);
    }
}

impl From<EntrySingle> for EntryMutexStd {
    fn from(entry: EntrySingle) -> Self {
        std::sync::Arc::new(std::sync::Mutex::new(entry))
    }
}
