//! The BEP 15 wire format.
//!
//! The server side of the protocol: requests are parsed from datagrams,
//! responses are written into them. All integers are network byte order
//! (big endian).
//!
//! Refer to [BEP 15. UDP Tracker Protocol for `BitTorrent`](https://www.bittorrent.org/beps/bep_0015.html)
//! for the authoritative packet layouts.
pub mod request;
pub mod response;

pub use request::{AnnounceRequest, ConnectRequest, Request, RequestParseError, ScrapeRequest};
pub use response::{
    AnnounceResponse, ConnectResponse, ErrorResponse, Ip, Response, ResponsePeer, ScrapeResponse, TorrentScrapeStatistics,
};

/// The magic constant that identifies the protocol in a `connect` request.
pub const PROTOCOL_ID: i64 = 0x0417_2710_1980;

pub const ACTION_CONNECT: i32 = 0;
pub const ACTION_ANNOUNCE: i32 = 1;
pub const ACTION_SCRAPE: i32 = 2;
pub const ACTION_ERROR: i32 = 3;

/// The connection id handed out by `connect` and replayed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub i64);

/// Echoed verbatim so the client can match responses to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub i32);

/// Seconds the client should wait before the next announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceInterval(pub i32);

/// A seeder or leecher count in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberOfPeers(pub i32);

/// A completed-downloads count in a scrape response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberOfDownloads(pub i32);

/// A TCP port a peer listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(pub u16);

/// Opaque random key sent by announcing clients; used by trackers that
/// want to recognize a peer across IP changes. Parsed and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerKey(pub u32);
