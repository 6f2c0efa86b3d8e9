//! Axum [`extractor`](axum::extract) for the
//! [`ClientIpSources`]
//! struct.
//!
//! It extracts the two candidate sources for the client IP:
//!
//! - The right-most IP in the `X-Forwarded-For` header.
//! - The IP of the connected socket.
//!
//! Which one is used depends on the reverse-proxy configuration and the
//! proxy permission of the connecting IP; that decision belongs to the
//! [`peer_ip_resolver`](crate::servers::http::v1::services::peer_ip_resolver).
use std::net::{IpAddr, SocketAddr};

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Response;

use crate::servers::http::v1::services::peer_ip_resolver::ClientIpSources;

/// Extractor for the [`ClientIpSources`] struct.
pub struct Extract(pub ClientIpSources);

#[async_trait]
impl<S> FromRequestParts<S> for Extract
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let right_most_x_forwarded_for = maybe_right_most_forwarded_ip(parts);

        let connection_info_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Extract(ClientIpSources {
            right_most_x_forwarded_for,
            connection_info_ip,
        }))
    }
}

/// The right-most IP in the `X-Forwarded-For` header, i.e. the one added
/// by the proxy closest to the tracker. Earlier entries are client
/// supplied and cannot be trusted.
fn maybe_right_most_forwarded_ip(parts: &Parts) -> Option<IpAddr> {
    parts
        .headers
        .get("X-Forwarded-For")?
        .to_str()
        .ok()?
        .split(',')
        .next_back()?
        .trim()
        .parse()
        .ok()
}
