//! The ring of time buckets holding a torrent's peers.
use std::net::SocketAddr;

use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch};

use crate::{BUCKET_COUNT, BUCKET_WIDTH};

/// One time slice of the swarm. Peers are kept by value in an unsorted
/// vector; swarms per bucket are small enough that linear scans beat any
/// indexed structure.
#[derive(Clone, Debug, Default)]
struct PeerBucket {
    peers: Vec<peer::Peer>,
}

impl PeerBucket {
    fn position(&self, addr: &SocketAddr) -> Option<usize> {
        self.peers.iter().position(|peer| peer.peer_addr == *addr)
    }
}

/// The bucket ring. `last_slot` is the absolute slot number (seconds since
/// the epoch divided by the bucket width) the ring was last rotated to;
/// the bucket at `last_slot % BUCKET_COUNT` is the one receiving new
/// announces. Rotating over a bucket reclaims its peers implicitly.
#[derive(Clone, Debug)]
pub struct BucketRing {
    buckets: Vec<PeerBucket>,
    last_slot: u64,
}

impl Default for BucketRing {
    fn default() -> Self {
        Self {
            buckets: vec![PeerBucket::default(); BUCKET_COUNT],
            last_slot: 0,
        }
    }
}

/// The absolute slot number for a timestamp.
#[must_use]
pub fn slot(now: DurationSinceUnixEpoch) -> u64 {
    now.as_secs() / BUCKET_WIDTH.as_secs()
}

impl BucketRing {
    /// Advances the ring to the slot of `now`, clearing every bucket the
    /// rotation passes over. A rotation that lapped the whole ring clears
    /// everything. Time going backwards is ignored.
    pub fn rotate(&mut self, now: DurationSinceUnixEpoch) {
        let current = slot(now);

        if current <= self.last_slot {
            return;
        }

        let elapsed = (current - self.last_slot).min(BUCKET_COUNT as u64);

        for step in 1..=elapsed {
            let index = usize::try_from((self.last_slot + step) % BUCKET_COUNT as u64).expect("bucket index fits in usize");
            self.buckets[index].peers.clear();
        }

        self.last_slot = current;
    }

    /// Inserts the peer into the current bucket, removing any previous
    /// occurrence (a peer appears in at most one bucket at any time).
    /// Returns the previous record if there was one.
    pub fn upsert(&mut self, peer: peer::Peer) -> Option<peer::Peer> {
        let previous = self.remove(&peer.peer_addr);

        let index = usize::try_from(self.last_slot % BUCKET_COUNT as u64).expect("bucket index fits in usize");
        self.buckets[index].peers.push(peer);

        previous
    }

    /// Removes the peer with the given socket address from whichever
    /// bucket holds it.
    pub fn remove(&mut self, addr: &SocketAddr) -> Option<peer::Peer> {
        for bucket in &mut self.buckets {
            if let Some(position) = bucket.position(addr) {
                return Some(bucket.peers.swap_remove(position));
            }
        }

        None
    }

    #[must_use]
    pub fn get(&self, addr: &SocketAddr) -> Option<&peer::Peer> {
        self.buckets
            .iter()
            .find_map(|bucket| bucket.position(addr).map(|position| &bucket.peers[position]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &peer::Peer> {
        self.buckets.iter().flat_map(|bucket| bucket.peers.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.peers.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.peers.is_empty())
    }

    /// Live seeder and leecher counts, summed over all buckets.
    #[must_use]
    pub fn seeders_and_leechers(&self) -> (usize, usize) {
        let seeders = self.iter().filter(|peer| peer.is_seeder()).count();
        let leechers = self.len() - seeders;

        (seeders, leechers)
    }
}
