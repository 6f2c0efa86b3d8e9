//! The in-memory peer store: a sharded, time-bucketed index from infohash
//! to swarm peers.
//!
//! Peers live in a ring of [`BUCKET_COUNT`] time buckets per torrent. An
//! announce places the peer in the bucket of the current time slot; a
//! re-announce moves it there. When the ring rotates over a bucket its
//! peers are dropped wholesale, which gives O(1) expiry without per-peer
//! timers: a silent peer disappears after at most
//! `BUCKET_COUNT * BUCKET_WIDTH` seconds.
//!
//! Torrents are partitioned into [`SHARD_COUNT`] shards by the first byte
//! of the infohash. Sharding is a pure function of the infohash, so the
//! placement of a torrent is stable across restarts of a node. Each shard
//! owns an independent mutex; announces for different shards never contend.
use std::sync::Arc;
use std::time::Duration;

pub mod entry;
pub mod repository;

/// Number of time buckets in a torrent's ring.
pub const BUCKET_COUNT: usize = 24;

/// Width of one time bucket. Together with [`BUCKET_COUNT`] this bounds
/// the age of a peer record to a 36 minute window.
pub const BUCKET_WIDTH: Duration = Duration::from_secs(90);

/// Number of torrent shards. A power of two; the shard of an infohash is
/// its first byte masked down to this range.
pub const SHARD_COUNT: usize = 256;

pub type EntrySingle = entry::Torrent;
pub type EntryMutexStd = Arc<std::sync::Mutex<entry::Torrent>>;

pub type TorrentsSharded = repository::sharded_mutex_std::Sharded<EntryMutexStd>;
