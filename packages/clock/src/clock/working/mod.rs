use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use swarm_tracker_primitives::DurationSinceUnixEpoch;

use crate::clock;

#[allow(clippy::module_name_repetitions)]
pub struct WorkingClock;

/// Process-wide cached seconds since the Unix Epoch. Zero means "not
/// refreshed yet"; `now()` falls back to the OS clock in that case.
static CACHED_SECONDS: AtomicU64 = AtomicU64::new(0);

impl clock::Time for clock::Working {
    fn now() -> DurationSinceUnixEpoch {
        let cached = CACHED_SECONDS.load(Ordering::Relaxed);

        if cached == 0 {
            return clock::Working::refresh();
        }

        Duration::from_secs(cached)
    }

    fn dbg_clock_type() -> String {
        "Working".to_owned()
    }
}

impl clock::Working {
    /// Re-reads the OS clock into the cache and returns the fresh value.
    ///
    /// Called by the periodic clock-refresh job so that request handlers
    /// can read the time without a syscall.
    pub fn refresh() -> DurationSinceUnixEpoch {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        CACHED_SECONDS.store(now.as_secs(), Ordering::Relaxed);

        Duration::from_secs(now.as_secs())
    }
}
