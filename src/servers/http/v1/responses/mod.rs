//! HTTP responses for the HTTP tracker.
//!
//! Responses are bencoded dictionaries, per the `BitTorrent` BEPs.
pub mod announce;
pub mod error;
pub mod scrape;
pub mod stats;

pub use announce::{Compact, NonCompact};
