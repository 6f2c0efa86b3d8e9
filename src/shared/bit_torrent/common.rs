//! `BitTorrent` protocol constants shared by the delivery layers.

/// The maximum number of torrents that can be requested in a single scrape
/// request, for both the HTTP and the UDP tracker. 74 infohashes is what
/// fits in one UDP packet next to the request header.
pub const MAX_SCRAPE_TORRENTS: usize = 74;

/// The biggest UDP tracker packet the server reads or writes: an announce
/// response headed for an MTU-sized datagram.
pub const MAX_PACKET_SIZE: usize = 1496;
