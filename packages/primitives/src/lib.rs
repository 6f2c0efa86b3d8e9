//! Primitive types for the swarm tracker.
//!
//! This crate contains the basic data structures shared by the tracker
//! server crate and the other crates in the workspace: infohashes, peers,
//! announce events and aggregate swarm counters.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::info_hash::InfoHash;

pub mod announce_event;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;
pub mod torrent_metrics;

/// Duration since the Unix Epoch. The tracker clock resolution is one
/// second; sub-second precision is kept only because `std::time::Duration`
/// carries it for free.
pub type DurationSinceUnixEpoch = std::time::Duration;

/// Persisted per-torrent download counters, loaded from the saved-state
/// file on a cold start. Peers are never persisted.
pub type PersistentTorrents = BTreeMap<InfoHash, u32>;

/// The IP version used by a peer: IPv4 or IPv6.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum IPVersion {
    /// <https://en.wikipedia.org/wiki/Internet_Protocol_version_4>
    IPv4,
    /// <https://en.wikipedia.org/wiki/IPv6>
    IPv6,
}

/// A number of bytes reported by a peer: `uploaded`, `downloaded` or
/// `left`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumberOfBytes(pub i64);

/// The mode the tracker will run in.
///
/// In `public` mode every infohash is tracked. The two listed modes gate
/// announces and scrapes on the access list: a whitelist only serves the
/// listed infohashes, a blacklist serves everything but them.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum TrackerMode {
    /// Will track every new info hash and serve every peer.
    #[serde(rename = "public")]
    #[default]
    Public,

    /// Will only track whitelisted info hashes.
    #[serde(rename = "listed")]
    Listed,

    /// Will track everything except blacklisted info hashes.
    #[serde(rename = "blacklisted")]
    Blacklisted,
}
