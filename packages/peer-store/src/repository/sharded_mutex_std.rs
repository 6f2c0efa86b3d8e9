use std::collections::HashMap;
use std::sync::Mutex;

use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
use swarm_tracker_primitives::{peer, DurationSinceUnixEpoch, PersistentTorrents};

use super::{shard_index, Repository};
use crate::entry::{Entry, EntrySync};
use crate::{EntryMutexStd, EntrySingle, SHARD_COUNT};

/// The sharded torrent index. Every shard owns an independent mutex over
/// its slice of the infohash space; the mutex is held only for map
/// operations, peer updates happen under the entry's own lock.
#[derive(Debug)]
pub struct Sharded<T> {
    shards: Vec<Mutex<HashMap<InfoHash, T>>>,
}

impl<T> Default for Sharded<T> {
    fn default() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }
}

impl<T> Sharded<T> {
    fn shard(&self, info_hash: &InfoHash) -> &Mutex<HashMap<InfoHash, T>> {
        &self.shards[shard_index(info_hash)]
    }
}

impl Repository<EntryMutexStd> for Sharded<EntryMutexStd>
where
    EntryMutexStd: EntrySync,
    EntrySingle: Entry,
{
    fn update_torrent_with_peer_and_get_stats(&self, info_hash: &InfoHash, peer: &peer::Peer) -> (bool, SwarmMetadata) {
        let entry = {
            let mut shard = self.shard(info_hash).lock().expect("it should get the shard lock");
            shard.entry(*info_hash).or_default().clone()
        };

        entry.upsert_peer_and_get_stats(peer)
    }

    fn get(&self, key: &InfoHash) -> Option<EntryMutexStd> {
        let shard = self.shard(key).lock().expect("it should get the shard lock");
        shard.get(key).cloned()
    }

    fn get_metrics(&self) -> TorrentsMetrics {
        let mut metrics = TorrentsMetrics::default();

        for shard in &self.shards {
            let entries: Vec<EntryMutexStd> = {
                let shard = shard.lock().expect("it should get the shard lock");
                shard.values().cloned().collect()
            };

            for entry in entries {
                let stats = entry.get_swarm_metadata();
                metrics.complete += u64::from(stats.complete);
                metrics.downloaded += u64::from(stats.downloaded);
                metrics.incomplete += u64::from(stats.incomplete);
                metrics.torrents += 1;
            }
        }

        metrics
    }

    fn get_shard_metadata(&self, shard: usize) -> Vec<(InfoHash, SwarmMetadata)> {
        let entries: Vec<(InfoHash, EntryMutexStd)> = {
            let shard = self.shards[shard].lock().expect("it should get the shard lock");
            shard.iter().map(|(info_hash, entry)| (*info_hash, entry.clone())).collect()
        };

        entries
            .into_iter()
            .map(|(info_hash, entry)| (info_hash, entry.get_swarm_metadata()))
            .collect()
    }

    fn import_persistent(&self, persistent_torrents: &PersistentTorrents) {
        for (info_hash, completed) in persistent_torrents {
            let mut shard = self.shard(info_hash).lock().expect("it should get the shard lock");

            if shard.contains_key(info_hash) {
                continue;
            }

            shard.insert(*info_hash, EntrySingle::with_downloaded(*completed).into());
        }
    }

    fn remove(&self, key: &InfoHash) -> Option<EntryMutexStd> {
        let mut shard = self.shard(key).lock().expect("it should get the shard lock");
        shard.remove(key)
    }

    fn sweep(&self, now: DurationSinceUnixEpoch, policy: &TrackerPolicy) {
        for shard in &self.shards {
            let mut shard = shard.lock().expect("it should get the shard lock");

            shard.retain(|_, entry| {
                entry.rotate_buckets(now);
                entry.is_good(policy)
            });
        }
    }
}
