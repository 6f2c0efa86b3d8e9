//! Error types for the UDP server.
use std::panic::Location;

use swarm_tracker_located_error::LocatedError;
use thiserror::Error;

/// Error returned by the UDP server.
#[derive(Error, Debug)]
pub enum Error {
    /// The connection id in the request did not verify against any valid
    /// slot. The request is silently dropped.
    #[error("connection id could not be verified, {location}")]
    InvalidConnectionId { location: &'static Location<'static> },

    /// An error from the core tracker (for example a denied infohash).
    #[error("tracker server error: {source}")]
    TrackerError {
        source: LocatedError<'static, dyn std::error::Error + Send + Sync>,
    },
}
