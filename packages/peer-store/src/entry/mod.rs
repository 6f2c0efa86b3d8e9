use std::net::SocketAddr;

use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch};

use self::bucket_ring::BucketRing;

pub mod bucket_ring;
pub mod mutex_std;
pub mod single;

pub trait Entry {
    /// It returns the swarm metadata (statistics) as a struct:
    ///
    /// `(seeders, completed, leechers)`
    fn get_swarm_metadata(&self) -> SwarmMetadata;

    /// Returns True if Still a Valid Entry according to the Tracker Policy
    fn is_good(&self, policy: &TrackerPolicy) -> bool;

    /// Returns True if the Peers is Empty
    fn peers_is_empty(&self) -> bool;

    /// Returns the number of Peers
    fn get_peers_len(&self) -> usize;

    /// Get a uniform random subsample of the swarm peers, optionally
    /// limiting the result. Without a limit all peers are returned; the
    /// order is unspecified either way.
    fn get_peers(&self, limit: Option<usize>) -> Vec<peer::Peer>;

    /// It returns the list of peers for a given peer client, optionally
    /// limiting the result.
    ///
    /// It filters out the input peer, typically because we want to return
    /// this list of peers to that client peer.
    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<peer::Peer>;

    /// It updates a peer and returns true if the number of complete downloads have increased.
    ///
    /// The announce timestamp carried by the peer decides the target time
    /// bucket; a re-announce moves the existing record there. The number of
    /// peers that have completed downloading is updated when the peer
    /// reports the `completed` event for the first time. That's the total
    /// torrent downloads counter.
    fn upsert_peer(&mut self, peer: &peer::Peer) -> bool;

    /// Advances the bucket ring to `now`, dropping every peer whose bucket
    /// the rotation passed over.
    fn rotate_buckets(&mut self, now: DurationSinceUnixEpoch);
}

#[allow(clippy::module_name_repetitions)]
pub trait EntrySync {
    fn get_swarm_metadata(&self) -> SwarmMetadata;
    fn is_good(&self, policy: &TrackerPolicy) -> bool;
    fn peers_is_empty(&self) -> bool;
    fn get_peers_len(&self) -> usize;
    fn get_peers(&self, limit: Option<usize>) -> Vec<peer::Peer>;
    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<peer::Peer>;
    fn upsert_peer(&self, peer: &peer::Peer) -> bool;
    fn upsert_peer_and_get_stats(&self, peer: &peer::Peer) -> (bool, SwarmMetadata);
    fn rotate_buckets(&self, now: DurationSinceUnixEpoch);
}

/// A data structure containing all the information about a torrent in the tracker.
///
/// This is the tracker entry for a given torrent and contains the swarm
/// data, that's the list of all the peers trying to download the same
/// torrent, spread over the ring of time buckets. The tracker keeps one
/// entry like this for every torrent.
#[derive(Clone, Debug, Default)]
pub struct Torrent {
    /// The swarm: a network of peers that are all trying to download the
    /// torrent associated to this entry, held in a ring of time buckets.
    pub(crate) peers: BucketRing,
    /// The number of peers that have ever completed downloading the
    /// torrent associated to this entry. Saturates, never wraps.
    pub(crate) downloaded: u64,
}

impl Torrent {
    /// An entry whose `downloaded` counter was seeded from the saved-state
    /// file.
    #[must_use]
    pub fn with_downloaded(downloaded: u32) -> Self {
        Self {
            peers: BucketRing::default(),
            downloaded: u64::from(downloaded),
        }
    }
}
