//! Axum [`handlers`](axum#handlers) for the `/stats` endpoint.
//!
//! The endpoint is only served to IPs holding the stat permission; every
//! other client gets a `403`. The `format` query param picks between the
//! plain-text default and JSON.
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::access_list::Permissions;
use crate::core::services::statistics::get_metrics;
use crate::core::Tracker;
use crate::servers::http::v1::extractors::client_ip_sources::Extract as ExtractClientIpSources;
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::responses::stats::{Format, Stats};

/// It handles the `stats` request.
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ExtractClientIpSources(client_ip_sources): ExtractClientIpSources,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let authorized = client_ip_sources
        .connection_info_ip
        .is_some_and(|ip| tracker.allows(&ip, Permissions::MAY_STAT));

    if !authorized {
        return StatusCode::FORBIDDEN.into_response();
    }

    let format = extract_format(raw_query.as_deref());

    let metrics = get_metrics(tracker.clone()).await;

    Stats::from(metrics).into_response(&format)
}

fn extract_format(maybe_raw_query: Option<&str>) -> Format {
    let format = maybe_raw_query
        .and_then(|raw_query| raw_query.parse::<Query>().ok())
        .and_then(|query| query.get_param("format"));

    match format.as_deref() {
        Some("json") => Format::Json,
        _ => Format::Text,
    }
}
