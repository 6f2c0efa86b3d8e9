//! The HTTP tracker.
//!
//! A `BitTorrent` tracker over HTTP, implementing:
//!
//! - [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 23. Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
//! - [BEP 48. Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html)
//!
//! Plus two endpoints outside the BEPs, kept from classic open trackers:
//! a `/stats` endpoint for permitted IPs and a root path that redirects to
//! a configured URL.
//!
//! Clients talk HTTP `GET` only; responses are bencoded dictionaries.
//! Failures are answered with a `"failure reason"` dictionary rather than
//! an HTTP error status, because that's what `BitTorrent` clients parse.
pub mod percent_encoding;
pub mod v1;

pub const HTTP_TRACKER_LOG_TARGET: &str = "HTTP TRACKER";
