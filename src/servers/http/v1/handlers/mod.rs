//! Axum [`handlers`](axum#handlers) for the HTTP tracker requests.
pub mod announce;
pub mod health_check;
pub mod root;
pub mod scrape;
pub mod stats;

use std::net::IpAddr;
use std::sync::Arc;

use crate::core::access_list::Permissions;
use crate::core::Tracker;
use crate::servers::http::v1::responses;
use crate::servers::http::v1::services::peer_ip_resolver::{self, ClientIpSources};

/// Resolves the peer IP for a request.
///
/// The `X-Forwarded-For` header is only honored when the tracker is
/// configured to sit behind a reverse proxy **and** the connecting IP
/// holds the proxy permission; anything else would let any client spoof
/// its address.
pub(crate) fn resolve_peer_ip(
    tracker: &Arc<Tracker>,
    client_ip_sources: &ClientIpSources,
) -> Result<IpAddr, responses::error::Error> {
    let use_forwarded_header = tracker.is_behind_reverse_proxy()
        && client_ip_sources
            .connection_info_ip
            .is_some_and(|ip| tracker.allows(&ip, Permissions::MAY_PROXY));

    peer_ip_resolver::invoke(use_forwarded_header, client_ip_sources).map_err(responses::error::Error::from)
}
