//! Torrent queries that walk the whole store.
//!
//! The full scrape iterates every shard. To keep announce latency flat the
//! walk holds one shard lock at a time and yields to the runtime between
//! shards, so a big response is assembled across scheduler turns instead
//! of monopolizing a worker.
use swarm_tracker_peer_store::repository::Repository;
use swarm_tracker_peer_store::SHARD_COUNT;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;

use crate::core::Tracker;

/// The swarm metadata of every torrent the tracker knows, in shard order.
/// The order within a shard is unspecified.
pub async fn get_all_swarm_metadata(tracker: &Tracker) -> Vec<(InfoHash, SwarmMetadata)> {
    let mut files = Vec::new();

    for shard in 0..SHARD_COUNT {
        files.extend(tracker.torrents.get_shard_metadata(shard));

        tokio::task::yield_now().await;
    }

    files
}
