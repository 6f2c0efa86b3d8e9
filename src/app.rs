//! Swarm Tracker application.
//!
//! The tracker application has a [`main`](crate#) entry point which calls
//! [`bootstrap::app::setup`](crate::bootstrap::app::setup) to build the
//! tracker and then this module's [`start`] function to launch the jobs:
//!
//! - The cached clock refresh timer.
//! - The peer store cleanup timer.
//! - The access list reload signal watcher.
//! - One job per enabled HTTP and UDP tracker listener.
//! - The live-sync sender and receiver, when enabled.
//!
//! Before any listener accepts traffic the access list and the saved
//! state are cold-loaded, so the first announce already sees them.
use std::sync::Arc;

use anyhow::Context;
use swarm_tracker_configuration::Configuration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::bootstrap::jobs::{accesslist_reload, clock_refresh, http_tracker, livesync, torrent_cleanup, udp_tracker};
use crate::core::sync::PeerEvent;
use crate::core::Tracker;
use crate::servers::signals::Halt;

/// The handles of the running application.
pub struct Running {
    jobs: Vec<JoinHandle<()>>,
    halt_channels: Vec<oneshot::Sender<Halt>>,
}

impl Running {
    /// Asks every socket-owning job to stop and waits for them.
    pub async fn halt(self) {
        for tx_halt in self.halt_channels {
            drop(tx_halt.send(Halt::Normal));
        }

        for job in self.jobs {
            drop(job.await);
        }
    }
}

/// # Errors
///
/// Will return `Err` when a listener cannot be bound or a configured file
/// cannot be loaded. Startup errors are fatal; at runtime the jobs
/// recover locally instead.
pub async fn start(
    config: &Configuration,
    tracker: Arc<Tracker>,
    sync_events: Option<mpsc::Receiver<PeerEvent>>,
) -> anyhow::Result<Running> {
    let mut jobs: Vec<JoinHandle<()>> = vec![];
    let mut halt_channels: Vec<oneshot::Sender<Halt>> = vec![];

    // The clock cache must be warm before anything reads the time.
    jobs.push(clock_refresh::start_job());

    // Cold loads, before the listeners are reachable.
    if config.accesslist_path.is_some() {
        tracker.reload_access_list().await.context("could not load the access list")?;
    }

    if let Some(state_file_path) = &config.state_file_path {
        tracker.load_state_file(state_file_path).context("could not load the saved state")?;
    }

    jobs.push(accesslist_reload::start_job(&tracker));
    jobs.push(torrent_cleanup::start_job(config, &tracker));

    // Start the HTTP tracker listeners
    for http_tracker_config in &config.http_trackers {
        if let Some((job, tx_halt)) = http_tracker::start_job(http_tracker_config, tracker.clone()).await? {
            jobs.push(job);
            halt_channels.push(tx_halt);
        }
    }

    // Start the UDP tracker listeners
    for udp_tracker_config in &config.udp_trackers {
        if let Some((job, tx_halt)) = udp_tracker::start_job(udp_tracker_config, tracker.clone()).await? {
            jobs.push(job);
            halt_channels.push(tx_halt);
        }
    }

    // Start live-sync
    match sync_events {
        Some(events) if config.livesync.enabled => {
            let (job, tx_halt) = livesync::start_job(&config.livesync, tracker.clone(), events).await?;
            jobs.push(job);
            halt_channels.push(tx_halt);
        }
        Some(_) => {}
        None => {
            if config.livesync.enabled {
                warn!("live-sync is enabled but the tracker was built without the sync channel");
            }
        }
    }

    Ok(Running { jobs, halt_channels })
}
