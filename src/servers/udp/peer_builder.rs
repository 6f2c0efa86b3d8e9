//! Logic to extract the peer info from the announce request.
use std::net::{IpAddr, SocketAddr};

use swarm_tracker_clock::clock::Time;
use swarm_tracker_primitives::{peer, NumberOfBytes};

use super::protocol::AnnounceRequest;
use crate::CurrentClock;

/// Extracts the [`peer::Peer`] info from the announce request.
///
/// The IP the client claims in the request is ignored; only the datagram
/// source address can be trusted.
#[must_use]
pub fn from_request(announce_request: &AnnounceRequest, peer_ip: &IpAddr) -> peer::Peer {
    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port.0),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes(announce_request.bytes_uploaded),
        downloaded: NumberOfBytes(announce_request.bytes_downloaded),
        left: NumberOfBytes(announce_request.bytes_left),
        event: announce_request.event,
    }
}
