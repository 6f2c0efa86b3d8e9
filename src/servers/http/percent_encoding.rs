//! This module contains functions for percent decoding infohashes and peer IDs.
//!
//! `BitTorrent` infohashes and peer ids are percent encoded like any other
//! URL parameter, but they encode raw binary (byte arrays) which is often
//! not valid UTF-8. That makes the string-oriented helpers of the
//! `percent_encoding` crate unusable directly; the byte iterator is what
//! we need.
//!
//! More information about "Percent Encoding":
//!
//! - <https://datatracker.ietf.org/doc/html/rfc3986#section-2.1>
//! - <https://en.wikipedia.org/wiki/URL_encoding>
use swarm_tracker_primitives::info_hash::{self, InfoHash};
use swarm_tracker_primitives::peer;

/// Percent decodes a percent encoded infohash. Internally an
/// [`InfoHash`] is a 20-byte array.
///
/// For example, given the infohash `3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0`,
/// it's percent encoded representation is `%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0`.
///
/// ```rust
/// use std::str::FromStr;
/// use swarm_tracker::servers::http::percent_encoding::percent_decode_info_hash;
/// use swarm_tracker_primitives::info_hash::InfoHash;
///
/// let encoded_infohash = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";
///
/// let info_hash = percent_decode_info_hash(encoded_infohash).unwrap();
///
/// assert_eq!(
///     info_hash,
///     InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
/// );
/// ```
///
/// # Errors
///
/// Will return `Err` if the decoded bytes do not represent a valid
/// [`InfoHash`].
pub fn percent_decode_info_hash(raw_info_hash: &str) -> Result<InfoHash, info_hash::ConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_info_hash).collect::<Vec<u8>>();
    InfoHash::try_from(bytes)
}

/// Percent decodes a percent encoded peer id. Internally a peer [`Id`](peer::Id)
/// is a 20-byte array.
///
/// # Errors
///
/// Will return `Err` if the decoded bytes do not represent a valid [`peer::Id`].
pub fn percent_decode_peer_id(raw_peer_id: &str) -> Result<peer::Id, peer::IdConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_peer_id).collect::<Vec<u8>>();
    peer::Id::try_from(bytes)
}
