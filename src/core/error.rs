//! Error returned by the core `Tracker`.
//!
//! Error | Context | Description
//! ---|---|---
//! `TorrentNotOnWhitelist` | Authorization | The tracker runs in `listed` mode and the infohash is not on the whitelist.
//! `TorrentOnBlacklist` | Authorization | The tracker runs in `blacklisted` mode and the infohash is on the blacklist.
use std::panic::Location;

use swarm_tracker_primitives::info_hash::InfoHash;

/// Authorization error returned by the core `Tracker`
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("The torrent: {info_hash}, is not whitelisted, {location}")]
    TorrentNotOnWhitelist {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },

    #[error("The torrent: {info_hash}, is blacklisted, {location}")]
    TorrentOnBlacklist {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },
}
