//! Axum extractors for the HTTP tracker requests.
//!
//! Announce and scrape query strings carry raw binary (infohashes and peer
//! ids), which `serde_urlencoded`-style extractors mangle. These
//! extractors parse the raw query component instead and reject with a
//! bencoded `failure reason` response, which is what `BitTorrent` clients
//! expect.
pub mod announce_request;
pub mod client_ip_sources;
pub mod scrape_request;
