//! Logic to start a new HTTP tracker server instance.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::info;

use super::routes::router;
use crate::core::Tracker;
use crate::servers::http::HTTP_TRACKER_LOG_TARGET;
use crate::servers::signals::{wait_for_halt, Halt};

/// Binds the listener and spawns the serve loop with graceful shutdown.
///
/// Binding happens before spawning so that a busy port is a startup
/// error, not a background panic.
///
/// # Errors
///
/// Will return `Err` if the socket cannot be bound.
pub async fn start(
    bind_to: SocketAddr,
    tracker: Arc<Tracker>,
    rx_halt: tokio::sync::oneshot::Receiver<Halt>,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(bind_to)
        .await
        .with_context(|| format!("could not bind http tracker to socket {bind_to}"))?;

    let address = listener.local_addr().context("could not get local address")?;

    info!(target: HTTP_TRACKER_LOG_TARGET, "Starting on: http://{address}");

    let app = router(tracker, address);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(wait_for_halt(
                rx_halt,
                format!("Halting HTTP tracker on: http://{address}"),
            ))
            .await
            .expect("the HTTP tracker server should not fail");

        info!(target: HTTP_TRACKER_LOG_TARGET, "Stopped server on: http://{address}");
    });

    Ok((address, handle))
}
