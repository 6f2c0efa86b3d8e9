//! Axum [`handlers`](axum#handlers) for the `scrape` requests.
//!
//! A scrape without any `info_hash` param is a full scrape. Walking the
//! whole store is expensive, so full scrapes are only served to IPs
//! holding the stat permission.
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::core::access_list::Permissions;
use crate::core::{ScrapeData, Tracker};
use crate::servers::http::v1::extractors::client_ip_sources::Extract as ExtractClientIpSources;
use crate::servers::http::v1::extractors::scrape_request::ExtractRequest;
use crate::servers::http::v1::handlers::resolve_peer_ip;
use crate::servers::http::v1::requests::scrape::Scrape;
use crate::servers::http::v1::responses;
use crate::servers::http::v1::services;
use crate::servers::http::v1::services::peer_ip_resolver::ClientIpSources;

/// It handles the `scrape` request.
#[allow(clippy::unused_async)]
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ExtractRequest(scrape_request): ExtractRequest,
    ExtractClientIpSources(client_ip_sources): ExtractClientIpSources,
) -> Response {
    debug!("http scrape request: {:#?}", scrape_request);

    match handle_scrape(&tracker, &scrape_request, &client_ip_sources).await {
        Ok(scrape_data) => responses::scrape::Bencoded::from(scrape_data).into_response(),
        Err(error_response) => error_response,
    }
}

async fn handle_scrape(
    tracker: &Arc<Tracker>,
    scrape_request: &Scrape,
    client_ip_sources: &ClientIpSources,
) -> Result<ScrapeData, Response> {
    let peer_ip = match resolve_peer_ip(tracker, client_ip_sources) {
        Ok(peer_ip) => peer_ip,
        Err(error) => return Err(error.into_response()),
    };

    if scrape_request.info_hashes.is_empty() {
        // The full scrape is gated on the *connection* IP: a forwarded
        // header must not be able to borrow the permission.
        let authorized = client_ip_sources
            .connection_info_ip
            .is_some_and(|ip| tracker.allows(&ip, Permissions::MAY_STAT));

        if !authorized {
            return Err(StatusCode::FORBIDDEN.into_response());
        }

        return Ok(services::scrape::invoke_full_scrape(tracker.clone(), &peer_ip).await);
    }

    Ok(services::scrape::invoke(tracker.clone(), &scrape_request.info_hashes, &peer_ip).await)
}
