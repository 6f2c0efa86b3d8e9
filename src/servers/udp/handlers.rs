//! Handlers for the UDP server.
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use swarm_tracker_configuration::{DEFAULT_NUMWANT, MAX_NUMWANT};
use swarm_tracker_located_error::DynError;
use swarm_tracker_primitives::info_hash::InfoHash;
use tracing::debug;

use super::connection_cookie::{check, from_connection_id, into_connection_id, make};
use super::error::Error;
use super::peer_builder;
use super::protocol::{
    AnnounceInterval, AnnounceRequest, AnnounceResponse, ConnectRequest, ConnectResponse, ErrorResponse, NumberOfDownloads,
    NumberOfPeers, Port, Request, Response, ResponsePeer, ScrapeRequest, ScrapeResponse, TorrentScrapeStatistics,
    TransactionId,
};
use super::RawRequest;
use crate::core::{statistics, ScrapeData, Tracker};
use crate::shared::bit_torrent::common::MAX_SCRAPE_TORRENTS;

/// It handles one incoming UDP datagram.
///
/// Returns `None` when the tracker must stay silent:
///
/// - The datagram does not parse as a request. Answering garbage would
///   turn the tracker into an amplification reflector.
/// - The connection id does not verify. Counted, then dropped.
pub(crate) async fn handle_packet(udp_request: &RawRequest, tracker: &Arc<Tracker>) -> Option<Response> {
    debug!("Handling Packet: {udp_request:?}");

    let request = match Request::parse(&udp_request.payload, MAX_SCRAPE_TORRENTS) {
        Ok(request) => request,
        Err(e) => {
            debug!("dropping unparsable datagram from {}: {e}", udp_request.from);
            return None;
        }
    };

    let transaction_id = match &request {
        Request::Connect(connect_request) => connect_request.transaction_id,
        Request::Announce(announce_request) => announce_request.transaction_id,
        Request::Scrape(scrape_request) => scrape_request.transaction_id,
    };

    match handle_request(request, udp_request.from, tracker).await {
        Ok(response) => Some(response),
        Err(Error::InvalidConnectionId { .. }) => {
            tracker.send_stats_event(statistics::Event::UdpConnectionIdMismatch).await;
            None
        }
        Err(e) => Some(handle_error(&e, transaction_id)),
    }
}

/// It dispatches the request to the correct handler.
///
/// # Errors
///
/// If a error happens in the `handle_request` function, it will just return the  `ServerError`.
pub async fn handle_request(request: Request, remote_addr: SocketAddr, tracker: &Tracker) -> Result<Response, Error> {
    debug!("Handling Request: {request:?} to: {remote_addr:?}");

    match request {
        Request::Connect(connect_request) => handle_connect(remote_addr, &connect_request, tracker).await,
        Request::Announce(announce_request) => handle_announce(remote_addr, &announce_request, tracker).await,
        Request::Scrape(scrape_request) => handle_scrape(remote_addr, &scrape_request, tracker).await,
    }
}

/// It handles the `Connect` request.
///
/// # Errors
///
/// This function does not ever return an error.
pub async fn handle_connect(remote_addr: SocketAddr, request: &ConnectRequest, tracker: &Tracker) -> Result<Response, Error> {
    debug!("udp connect request: {:#?}", request);

    let connection_cookie = make(&remote_addr.ip());
    let connection_id = into_connection_id(&connection_cookie);

    let response = ConnectResponse {
        transaction_id: request.transaction_id,
        connection_id,
    };

    debug!("udp connect response: {:#?}", response);

    // send stats event
    match remote_addr {
        SocketAddr::V4(_) => {
            tracker.send_stats_event(statistics::Event::Udp4Connect).await;
        }
        SocketAddr::V6(_) => {
            tracker.send_stats_event(statistics::Event::Udp6Connect).await;
        }
    }

    Ok(Response::from(response))
}

/// It handles the `Announce` request.
///
/// # Errors
///
/// Will return an `Error::InvalidConnectionId` (silent drop) or a tracker
/// error (answered with an `error` response).
pub async fn handle_announce(
    remote_addr: SocketAddr,
    announce_request: &AnnounceRequest,
    tracker: &Tracker,
) -> Result<Response, Error> {
    debug!("udp announce request: {:#?}", announce_request);

    check(&remote_addr.ip(), &from_connection_id(&announce_request.connection_id))?;

    let info_hash = announce_request.info_hash;
    let remote_client_ip = remote_addr.ip();

    // Authorization
    if let Err(e) = tracker.authorize(&info_hash) {
        tracker.send_stats_event(statistics::Event::AccesslistDenied).await;

        return Err(Error::TrackerError {
            source: (Arc::new(e) as DynError).into(),
        });
    }

    let mut peer = peer_builder::from_request(announce_request, &remote_client_ip);

    let response = tracker
        .announce(&info_hash, &mut peer, &remote_client_ip, peers_wanted(announce_request))
        .await;

    match remote_client_ip {
        IpAddr::V4(_) => {
            tracker.send_stats_event(statistics::Event::Udp4Announce).await;
        }
        IpAddr::V6(_) => {
            tracker.send_stats_event(statistics::Event::Udp6Announce).await;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_possible_wrap)]
    if remote_addr.is_ipv4() {
        let announce_response = AnnounceResponse {
            transaction_id: announce_request.transaction_id,
            announce_interval: AnnounceInterval(response.policy.interval as i32),
            leechers: NumberOfPeers(response.stats.incomplete as i32),
            seeders: NumberOfPeers(response.stats.complete as i32),
            peers: response
                .peers
                .iter()
                .filter_map(|peer| {
                    if let IpAddr::V4(ip) = peer.peer_addr.ip() {
                        Some(ResponsePeer::<Ipv4Addr> {
                            ip_address: ip,
                            port: Port(peer.peer_addr.port()),
                        })
                    } else {
                        None
                    }
                })
                .collect(),
        };

        debug!("udp announce response: {:#?}", announce_response);

        Ok(Response::from(announce_response))
    } else {
        let announce_response = AnnounceResponse {
            transaction_id: announce_request.transaction_id,
            announce_interval: AnnounceInterval(response.policy.interval as i32),
            leechers: NumberOfPeers(response.stats.incomplete as i32),
            seeders: NumberOfPeers(response.stats.complete as i32),
            peers: response
                .peers
                .iter()
                .filter_map(|peer| {
                    if let IpAddr::V6(ip) = peer.peer_addr.ip() {
                        Some(ResponsePeer::<Ipv6Addr> {
                            ip_address: ip,
                            port: Port(peer.peer_addr.port()),
                        })
                    } else {
                        None
                    }
                })
                .collect(),
        };

        debug!("udp announce response: {:#?}", announce_response);

        Ok(Response::from(announce_response))
    }
}

/// How many peers to return: the client's `num_want` capped by the
/// tracker, or the default when negative.
fn peers_wanted(announce_request: &AnnounceRequest) -> usize {
    if announce_request.peers_wanted < 0 {
        DEFAULT_NUMWANT
    } else {
        usize::try_from(announce_request.peers_wanted).unwrap_or(MAX_NUMWANT).min(MAX_NUMWANT)
    }
}

/// It handles the `Scrape` request.
///
/// # Errors
///
/// Will return an `Error::InvalidConnectionId` (silent drop).
pub async fn handle_scrape(remote_addr: SocketAddr, request: &ScrapeRequest, tracker: &Tracker) -> Result<Response, Error> {
    debug!("udp scrape request: {:#?}", request);

    check(&remote_addr.ip(), &from_connection_id(&request.connection_id))?;

    let info_hashes: Vec<InfoHash> = request.info_hashes.clone();

    let scrape_data = tracker.scrape(&info_hashes).await;

    let response = build_scrape_response(request, &scrape_data);

    // send stats event
    match remote_addr {
        SocketAddr::V4(_) => {
            tracker.send_stats_event(statistics::Event::Udp4Scrape).await;
        }
        SocketAddr::V6(_) => {
            tracker.send_stats_event(statistics::Event::Udp6Scrape).await;
        }
    }

    debug!("udp scrape response: {:#?}", response);

    Ok(Response::from(response))
}

/// The scrape entries must be in the same order as the infohashes in the
/// request; the client matches them by position.
fn build_scrape_response(request: &ScrapeRequest, scrape_data: &ScrapeData) -> ScrapeResponse {
    let mut torrent_stats: Vec<TorrentScrapeStatistics> = Vec::with_capacity(request.info_hashes.len());

    for info_hash in &request.info_hashes {
        let swarm_metadata = scrape_data.files.get(info_hash).copied().unwrap_or_default();

        #[allow(clippy::cast_possible_wrap)]
        let scrape_entry = TorrentScrapeStatistics {
            seeders: NumberOfPeers(swarm_metadata.complete as i32),
            completed: NumberOfDownloads(swarm_metadata.downloaded as i32),
            leechers: NumberOfPeers(swarm_metadata.incomplete as i32),
        };

        torrent_stats.push(scrape_entry);
    }

    ScrapeResponse {
        transaction_id: request.transaction_id,
        torrent_stats,
    }
}

fn handle_error(e: &Error, transaction_id: TransactionId) -> Response {
    let message = e.to_string();
    Response::from(ErrorResponse {
        transaction_id,
        message: message.into(),
    })
}
