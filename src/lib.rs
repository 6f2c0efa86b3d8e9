//! **Swarm Tracker** is a lightweight, in-memory
//! [`BitTorrent`](https://www.bittorrent.org/) tracker.
//!
//! Peers in a swarm need to know where they can find other peers with the
//! files they are looking for. Client peers announce their existence to a
//! tracker, and the tracker responds with a list of other peers in the
//! swarm.
//!
//! From the end-user perspective the tracker exposes:
//!
//! - One or more [`HTTP`](crate::servers::http) trackers (announce, scrape,
//!   stats and full-scrape endpoints).
//! - One or more [`UDP`](crate::servers::udp) trackers
//!   ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html)).
//! - Optional [live-sync](crate::servers::livesync) multicast replication
//!   between sibling trackers.
//!
//! The [`core`] module contains the domain logic shared by the delivery
//! layers: the sharded peer store, the infohash access list, the per-IP
//! permissions and the statistics. It never touches sockets.
//!
//! Swarm state is kept in memory only. An optional saved-state text file
//! can seed the per-torrent download counters on a cold start; peers are
//! never persisted (they re-announce within one interval anyway).
//!
//! Implemented BEPs:
//!
//! - [BEP 3](https://www.bittorrent.org/beps/bep_0003.html): The `BitTorrent` Protocol
//! - [BEP 7](https://www.bittorrent.org/beps/bep_0007.html): IPv6 Support
//! - [BEP 15](https://www.bittorrent.org/beps/bep_0015.html): UDP Tracker Protocol
//! - [BEP 23](https://www.bittorrent.org/beps/bep_0023.html): Tracker Returns Compact Peer Lists
//! - [BEP 48](https://www.bittorrent.org/beps/bep_0048.html): Tracker Protocol Extension: Scrape
pub mod app;
pub mod bootstrap;
pub mod core;
pub mod servers;
pub mod shared;

#[macro_use]
extern crate lazy_static;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
pub type CurrentClock = swarm_tracker_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub type CurrentClock = swarm_tracker_clock::clock::Stopped;
