//! Live-sync job starter.
use std::sync::Arc;
use std::time::Duration;

use swarm_tracker_configuration::LiveSync;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::sync::PeerEvent;
use crate::core::Tracker;
use crate::servers::livesync::launcher;
use crate::servers::signals::Halt;

/// It starts the live-sync sender and receiver tasks.
///
/// # Errors
///
/// Will return `Err` if the multicast group cannot be joined.
pub async fn start_job(
    config: &LiveSync,
    tracker: Arc<Tracker>,
    events: mpsc::Receiver<PeerEvent>,
) -> anyhow::Result<(JoinHandle<()>, oneshot::Sender<Halt>)> {
    let (tx_halt, rx_halt) = oneshot::channel::<Halt>();

    let (_address, handle) = launcher::start(
        &config.multicast_address,
        Duration::from_millis(config.flush_interval_ms),
        tracker,
        events,
        rx_halt,
    )
    .await?;

    Ok((handle, tx_halt))
}
