//! The service to resolve the peer IP.
//!
//! A tracker ignores the IP a peer claims in its announce params and uses
//! the IP it can observe. There are two candidates:
//!
//! - The IP of the connected socket.
//! - The right-most IP of the `X-Forwarded-For` header, when the tracker
//!   sits behind a reverse proxy **and** the connecting IP holds the
//!   proxy permission.
use std::net::IpAddr;
use std::panic::Location;

use thiserror::Error;

use crate::servers::http::v1::responses;

/// The two candidate sources for the client IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIpSources {
    /// The right-most IP from the `X-Forwarded-For` header.
    pub right_most_x_forwarded_for: Option<IpAddr>,
    /// The IP from the connection info.
    pub connection_info_ip: Option<IpAddr>,
}

/// Errors that can occur when resolving the peer IP.
#[derive(Error, Debug)]
pub enum PeerIpResolutionError {
    /// The tracker should use the `X-Forwarded-For` header but it is
    /// missing or malformed.
    #[error("missing or invalid the right most X-Forwarded-For IP (mandatory on reverse proxy tracker configuration) in {location}")]
    MissingRightMostXForwardedForIp { location: &'static Location<'static> },

    /// The connection IP is unknown, which cannot happen for a socket the
    /// server just accepted.
    #[error("cannot get the client IP from the connection info in {location}")]
    MissingClientIp { location: &'static Location<'static> },
}

impl From<PeerIpResolutionError> for responses::error::Error {
    fn from(err: PeerIpResolutionError) -> Self {
        responses::error::Error {
            failure_reason: format!("Error resolving peer IP: {err}"),
        }
    }
}

/// It resolves the peer IP.
///
/// `use_forwarded_header` must already factor in both the reverse-proxy
/// configuration and the proxy permission of the connecting IP.
///
/// # Errors
///
/// Will return an error if the chosen source is missing.
pub fn invoke(use_forwarded_header: bool, client_ip_sources: &ClientIpSources) -> Result<IpAddr, PeerIpResolutionError> {
    if use_forwarded_header {
        resolve_peer_ip_on_reverse_proxy(client_ip_sources)
    } else {
        resolve_peer_ip_without_reverse_proxy(client_ip_sources)
    }
}

fn resolve_peer_ip_without_reverse_proxy(remote_client_ip_sources: &ClientIpSources) -> Result<IpAddr, PeerIpResolutionError> {
    if let Some(ip) = remote_client_ip_sources.connection_info_ip {
        Ok(ip)
    } else {
        Err(PeerIpResolutionError::MissingClientIp {
            location: Location::caller(),
        })
    }
}

fn resolve_peer_ip_on_reverse_proxy(remote_client_ip_sources: &ClientIpSources) -> Result<IpAddr, PeerIpResolutionError> {
    if let Some(ip) = remote_client_ip_sources.right_most_x_forwarded_for {
        Ok(ip)
    } else {
        Err(PeerIpResolutionError::MissingRightMostXForwardedForIp {
            location: Location::caller(),
        })
    }
}
