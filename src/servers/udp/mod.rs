//! The UDP tracker: [BEP 15. UDP Tracker Protocol for `BitTorrent`](https://www.bittorrent.org/beps/bep_0015.html).
//!
//! The UDP protocol exists because HTTP per-announce overhead is brutal at
//! tracker scale. One datagram in, one datagram out; no connection state
//! on the server.
//!
//! # Connect
//!
//! Since UDP sources are trivially spoofed, a client must first `connect`:
//! the server answers with a `connection_id` derived from the client IP, a
//! rotating time slot and an instance secret (see
//! [`connection_cookie`]). The client replays that id in `announce` and
//! `scrape` requests; the server re-derives and compares instead of
//! keeping a table. Requests with a wrong id are dropped without an
//! answer, so the tracker cannot be used as an amplification reflector.
//!
//! # Actions
//!
//! | Action | Request | Response |
//! |---|---|---|
//! | `connect` | protocol magic, transaction id | connection id |
//! | `announce` | connection id, swarm state | interval, leechers, seeders, compact peer list |
//! | `scrape` | connection id, up to 74 infohashes | (seeders, completed, leechers) per infohash |
//! | `error` | - | transaction id, message |
pub mod connection_cookie;
pub mod error;
pub mod handlers;
pub mod launcher;
pub mod peer_builder;
pub mod protocol;

use std::net::SocketAddr;

pub const UDP_TRACKER_LOG_TARGET: &str = "UDP TRACKER";

/// One datagram as it came off the socket.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
}
