//! Job that refreshes the cached clock.
//!
//! Request handlers read the time from a process-wide cache instead of
//! the OS clock (see [`swarm_tracker_clock`]). One-second precision is
//! all the tracker needs, so a five-second refresh keeps every timestamp
//! within one bucket-rotation tolerance.
use std::time::Duration;

use swarm_tracker_clock::clock::Working;
use tokio::task::JoinHandle;

/// How often the cache is re-read from the OS clock.
const CLOCK_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// It starts the clock refresh job.
#[must_use]
pub fn start_job() -> JoinHandle<()> {
    // Prime the cache so the very first requests do not race the timer.
    Working::refresh();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLOCK_REFRESH_INTERVAL);

        loop {
            interval.tick().await;

            Working::refresh();
        }
    })
}
