//! Axum [`handlers`](axum#handlers) for the `announce` requests.
//!
//! The handler resolves the client IP, applies the access list and builds
//! the bencoded response. Infohashes the access list refuses are answered
//! `200 OK` with an empty swarm, because erroring would only make clients
//! retry harder.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use swarm_tracker_clock::clock::Time;
use swarm_tracker_configuration::{DEFAULT_NUMWANT, MAX_NUMWANT};
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::{peer, NumberOfBytes};
use tracing::debug;

use crate::core::{statistics, AnnounceData, Tracker};
use crate::servers::http::v1::extractors::announce_request::ExtractRequest;
use crate::servers::http::v1::extractors::client_ip_sources::Extract as ExtractClientIpSources;
use crate::servers::http::v1::handlers::resolve_peer_ip;
use crate::servers::http::v1::requests::announce::{Announce, Compact, Event};
use crate::servers::http::v1::responses::{self};
use crate::servers::http::v1::services;
use crate::servers::http::v1::services::peer_ip_resolver::ClientIpSources;
use crate::CurrentClock;

/// It handles the `announce` request.
#[allow(clippy::unused_async)]
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ExtractRequest(announce_request): ExtractRequest,
    ExtractClientIpSources(client_ip_sources): ExtractClientIpSources,
) -> Response {
    debug!("http announce request: {:#?}", announce_request);

    let announce_data =
        match handle_announce(&tracker, &announce_request, &client_ip_sources).await {
            Ok(announce_data) => announce_data,
            Err(error) => return error.into_response(),
        };

    build_response(&announce_request, announce_data)
}

async fn handle_announce(
    tracker: &Arc<Tracker>,
    announce_request: &Announce,
    client_ip_sources: &ClientIpSources,
) -> Result<AnnounceData, responses::error::Error> {
    let peer_ip = resolve_peer_ip(tracker, client_ip_sources)?;

    // Authorization. A denied infohash gets a valid response with an empty
    // swarm; only the counter tells the difference.
    if tracker.authorize(&announce_request.info_hash).is_err() {
        tracker.send_stats_event(statistics::Event::AccesslistDenied).await;

        return Ok(AnnounceData {
            peers: vec![],
            stats: SwarmMetadata::zeroed(),
            policy: tracker.get_announce_policy(),
        });
    }

    let mut peer = peer_from_request(announce_request, &peer_ip);

    let announce_data =
        services::announce::invoke(tracker.clone(), announce_request.info_hash, &mut peer, peers_wanted(announce_request)).await;

    Ok(announce_data)
}

/// How many peers to return: `numwant` capped by the tracker, none at all
/// for a `stopped` event.
fn peers_wanted(announce_request: &Announce) -> usize {
    if announce_request.event == Some(Event::Stopped) {
        return 0;
    }

    match announce_request.numwant {
        Some(numwant) => (numwant as usize).min(MAX_NUMWANT),
        None => DEFAULT_NUMWANT,
    }
}

fn build_response(announce_request: &Announce, announce_data: AnnounceData) -> Response {
    // Compact is the default; clients have to opt out with `compact=0`.
    if announce_request.compact == Some(Compact::NotAccepted) {
        let response = responses::announce::NonCompact::from(announce_data);
        response.into_response()
    } else {
        let response = responses::announce::Compact::from(announce_data);
        response.into_response()
    }
}

/// It builds a `Peer` from the announce request.
///
/// It ignores the peer address in the announce request params.
#[must_use]
fn peer_from_request(announce_request: &Announce, peer_ip: &IpAddr) -> peer::Peer {
    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes(announce_request.uploaded.unwrap_or(0)),
        downloaded: NumberOfBytes(announce_request.downloaded.unwrap_or(0)),
        left: NumberOfBytes(announce_request.left.unwrap_or(0)),
        event: map_to_announce_event(&announce_request.event),
    }
}

#[must_use]
fn map_to_announce_event(event: &Option<Event>) -> AnnounceEvent {
    match event {
        Some(event) => match &event {
            Event::Started => AnnounceEvent::Started,
            Event::Stopped => AnnounceEvent::Stopped,
            Event::Completed => AnnounceEvent::Completed,
        },
        None => AnnounceEvent::None,
    }
}
