//! Job that reloads the access list on `SIGHUP` (unix only).
//!
//! Operators edit the list file and signal the process; the new set is
//! swapped in atomically without a restart.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core;

/// It starts the access list reload signal watcher.
#[must_use]
pub fn start_job(tracker: &Arc<core::Tracker>) -> JoinHandle<()> {
    let tracker = tracker.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut hangup = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
                .expect("failed to install SIGHUP handler");

            while hangup.recv().await.is_some() {
                info!("SIGHUP received, reloading the access list..");

                if let Err(e) = tracker.reload_access_list().await {
                    error!("could not reload the access list: {e}");
                }
            }
        }

        #[cfg(not(unix))]
        {
            drop(tracker);
            std::future::pending::<()>().await;
        }
    })
}
