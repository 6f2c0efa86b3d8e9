//! `Stats` response for the HTTP tracker `/stats` endpoint.
//!
//! The endpoint is not part of any BEP; it is the operator window into the
//! tracker. Two formats are offered: a plain-text one for humans and
//! shell scripts (the default) and a JSON document for everything else.
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::services::statistics::TrackerMetrics;

/// The `/stats` output format, from the `format` query param.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// `Stats` resource, the serializable flat view of [`TrackerMetrics`].
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Stats {
    pub torrents: u64,
    pub seeders: u64,
    pub completed: u64,
    pub leechers: u64,
    pub tcp4_connections_handled: u64,
    pub tcp4_announces_handled: u64,
    pub tcp4_scrapes_handled: u64,
    pub tcp6_connections_handled: u64,
    pub tcp6_announces_handled: u64,
    pub tcp6_scrapes_handled: u64,
    pub udp4_connections_handled: u64,
    pub udp4_announces_handled: u64,
    pub udp4_scrapes_handled: u64,
    pub udp6_connections_handled: u64,
    pub udp6_announces_handled: u64,
    pub udp6_scrapes_handled: u64,
    pub fullscrapes_handled: u64,
    pub accesslist_denied_requests: u64,
    pub accesslist_lines_skipped: u64,
    pub udp_connection_id_mismatches: u64,
    pub livesync_records_sent: u64,
    pub livesync_records_received: u64,
}

impl From<TrackerMetrics> for Stats {
    fn from(metrics: TrackerMetrics) -> Self {
        Self {
            torrents: metrics.torrents_metrics.torrents,
            seeders: metrics.torrents_metrics.complete,
            completed: metrics.torrents_metrics.downloaded,
            leechers: metrics.torrents_metrics.incomplete,
            tcp4_connections_handled: metrics.protocol_metrics.tcp4_connections_handled,
            tcp4_announces_handled: metrics.protocol_metrics.tcp4_announces_handled,
            tcp4_scrapes_handled: metrics.protocol_metrics.tcp4_scrapes_handled,
            tcp6_connections_handled: metrics.protocol_metrics.tcp6_connections_handled,
            tcp6_announces_handled: metrics.protocol_metrics.tcp6_announces_handled,
            tcp6_scrapes_handled: metrics.protocol_metrics.tcp6_scrapes_handled,
            udp4_connections_handled: metrics.protocol_metrics.udp4_connections_handled,
            udp4_announces_handled: metrics.protocol_metrics.udp4_announces_handled,
            udp4_scrapes_handled: metrics.protocol_metrics.udp4_scrapes_handled,
            udp6_connections_handled: metrics.protocol_metrics.udp6_connections_handled,
            udp6_announces_handled: metrics.protocol_metrics.udp6_announces_handled,
            udp6_scrapes_handled: metrics.protocol_metrics.udp6_scrapes_handled,
            fullscrapes_handled: metrics.protocol_metrics.fullscrapes_handled,
            accesslist_denied_requests: metrics.protocol_metrics.accesslist_denied_requests,
            accesslist_lines_skipped: metrics.protocol_metrics.accesslist_lines_skipped,
            udp_connection_id_mismatches: metrics.protocol_metrics.udp_connection_id_mismatches,
            livesync_records_sent: metrics.protocol_metrics.livesync_records_sent,
            livesync_records_received: metrics.protocol_metrics.livesync_records_received,
        }
    }
}

impl Stats {
    /// Plain-text rendering: one `name: value` per line.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        format!(
            "torrents: {}\nseeders: {}\ncompleted: {}\nleechers: {}\n\
             tcp4 connections: {}\ntcp4 announces: {}\ntcp4 scrapes: {}\n\
             tcp6 connections: {}\ntcp6 announces: {}\ntcp6 scrapes: {}\n\
             udp4 connections: {}\nudp4 announces: {}\nudp4 scrapes: {}\n\
             udp6 connections: {}\nudp6 announces: {}\nudp6 scrapes: {}\n\
             fullscrapes: {}\naccesslist denied: {}\naccesslist lines skipped: {}\n\
             udp connection id mismatches: {}\nlivesync sent: {}\nlivesync received: {}\n",
            self.torrents,
            self.seeders,
            self.completed,
            self.leechers,
            self.tcp4_connections_handled,
            self.tcp4_announces_handled,
            self.tcp4_scrapes_handled,
            self.tcp6_connections_handled,
            self.tcp6_announces_handled,
            self.tcp6_scrapes_handled,
            self.udp4_connections_handled,
            self.udp4_announces_handled,
            self.udp4_scrapes_handled,
            self.udp6_connections_handled,
            self.udp6_announces_handled,
            self.udp6_scrapes_handled,
            self.fullscrapes_handled,
            self.accesslist_denied_requests,
            self.accesslist_lines_skipped,
            self.udp_connection_id_mismatches,
            self.livesync_records_sent,
            self.livesync_records_received,
        )
    }

    #[must_use]
    pub fn into_response(self, format: &Format) -> Response {
        match format {
            Format::Text => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_plain_text(),
            )
                .into_response(),
            Format::Json => (StatusCode::OK, Json(self)).into_response(),
        }
    }
}
