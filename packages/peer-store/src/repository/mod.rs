use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch, PersistentTorrents};

use crate::SHARD_COUNT;

pub mod sharded_mutex_std;

/// The shard a torrent lives in: a pure function of the first byte of its
/// infohash, so it is stable across process restarts.
#[must_use]
pub fn shard_index(info_hash: &InfoHash) -> usize {
    usize::from(info_hash.0[0]) & (SHARD_COUNT - 1)
}

pub trait Repository<T>: Default + 'static {
    /// Returns the entry for a torrent, if the tracker knows it.
    fn get(&self, key: &InfoHash) -> Option<T>;

    /// Aggregate metrics over every torrent in every shard.
    fn get_metrics(&self) -> TorrentsMetrics;

    /// One full-scrape chunk: the swarm metadata of every torrent in one
    /// shard. Callers iterate the shard cursor from `0` to
    /// [`SHARD_COUNT`](crate::SHARD_COUNT) and may yield between chunks,
    /// so a full scrape never holds more than one shard lock at a time.
    fn get_shard_metadata(&self, shard: usize) -> Vec<(InfoHash, SwarmMetadata)>;

    /// Seeds `downloaded` counters from the saved-state file. Existing
    /// entries are left alone.
    fn import_persistent(&self, persistent_torrents: &PersistentTorrents);

    /// Removes a torrent entry.
    fn remove(&self, key: &InfoHash) -> Option<T>;

    /// The periodic sweep: advances every torrent's bucket ring to `now`
    /// (reclaiming expired peers) and drops entries the policy no longer
    /// wants to keep. Shards are locked one at a time.
    fn sweep(&self, now: DurationSinceUnixEpoch, policy: &TrackerPolicy);

    /// It updates the peer's torrent entry (creating it if needed) and
    /// returns whether the completed-downloads counter changed, together
    /// with the swarm metadata after the update.
    fn update_torrent_with_peer_and_get_stats(&self, info_hash: &InfoHash, peer: &peer::Peer) -> (bool, SwarmMetadata);
}

#[cfg(test)]
mod tests {
    use swarm_tracker_primitives::info_hash::InfoHash;

    use super::shard_index;
    use crate::SHARD_COUNT;

    #[test]
    fn it_should_derive_the_shard_from_the_first_byte_of_the_infohash() {
        assert_eq!(shard_index(&InfoHash([0u8; 20])), 0);

        let mut info_hash = InfoHash([0u8; 20]);
        info_hash.0[0] = 0xff;
        assert_eq!(shard_index(&info_hash), 0xff);
    }

    #[test]
    fn it_should_ignore_every_byte_but_the_first() {
        let mut a = InfoHash([0u8; 20]);
        let mut b = InfoHash([0xffu8; 20]);
        a.0[0] = 42;
        b.0[0] = 42;

        assert_eq!(shard_index(&a), shard_index(&b));
    }

    #[test]
    fn it_should_always_be_in_range() {
        for byte in 0..=u8::MAX {
            let mut info_hash = InfoHash([0u8; 20]);
            info_hash.0[0] = byte;
            assert!(shard_index(&info_hash) < SHARD_COUNT);
        }
    }
}
