//! HTTP tracker job starter.
//!
//! The application can launch more than one HTTP tracker on different
//! ports; this module starts one of them.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use swarm_tracker_configuration::HttpTracker;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core;
use crate::servers::http::v1::launcher;
use crate::servers::signals::Halt;

/// It starts a new HTTP tracker server with the provided configuration.
///
/// # Errors
///
/// Will return `Err` if the bind address is invalid or busy.
pub async fn start_job(
    config: &HttpTracker,
    tracker: Arc<core::Tracker>,
) -> anyhow::Result<Option<(JoinHandle<()>, oneshot::Sender<Halt>)>> {
    if !config.enabled {
        info!("Note: Not loading HTTP tracker service, not enabled in configuration.");
        return Ok(None);
    }

    let bind_to: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid http tracker bind address: {}", config.bind_address))?;

    let (tx_halt, rx_halt) = oneshot::channel::<Halt>();

    let (_address, handle) = launcher::start(bind_to, tracker, rx_halt).await?;

    Ok(Some((handle, tx_halt)))
}
