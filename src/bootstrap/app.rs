//! Setup for the main tracker application.
//!
//! The [`setup`] function only builds the application and its
//! dependencies; it does not start any job. If you are looking for how
//! things are started you should read the [`app::start`](crate::app::start)
//! function documentation.
//!
//! Setup steps:
//!
//! 1. Load the application configuration and apply the CLI overrides.
//! 2. Initialize logging.
//! 3. Initialize static variables.
//! 4. Build the domain tracker with its statistics and live-sync channels.
use std::sync::Arc;

use anyhow::Context;
use swarm_tracker_clock::static_time;
use swarm_tracker_configuration::Configuration;
use tokio::sync::mpsc;

use super::cli::Args;
use super::config::initialize_configuration;
use crate::core::services::statistics;
use crate::core::{sync, Tracker};
use crate::shared::crypto;

/// It loads the configuration, initializes logging and statics and builds
/// the tracker.
///
/// When live-sync is enabled the returned receiver carries the peer
/// events for the live-sync sender task.
///
/// # Errors
///
/// Will return `Err` if the configuration is malformed.
pub fn setup(args: &Args) -> anyhow::Result<(Configuration, Arc<Tracker>, Option<mpsc::Receiver<sync::PeerEvent>>)> {
    let mut configuration = initialize_configuration(args.config.as_deref()).context("could not load the configuration")?;

    args.override_configuration(&mut configuration);

    super::logging::setup(&configuration);

    initialize_static();

    let (tracker, sync_events) = initialize_tracker(&configuration);

    Ok((configuration, tracker, sync_events))
}

/// It initializes the application static values.
///
/// These values are accessible throughout the entire application:
///
/// - The time when the application started.
/// - The per-process secret seed. It backs the UDP connection ids and
///   the live-sync instance id and changes when the process restarts.
fn initialize_static() {
    // Set the time the application started
    lazy_static::initialize(&static_time::TIME_AT_APP_START);

    crypto::initialize_instance_seed();
}

/// It builds the domain tracker: the statistics infrastructure always,
/// the live-sync channel only when the cluster replication is enabled.
fn initialize_tracker(config: &Configuration) -> (Arc<Tracker>, Option<mpsc::Receiver<sync::PeerEvent>>) {
    let (stats_event_sender, stats_repository) = statistics::setup::factory(config.tracker_usage_statistics);

    if config.livesync.enabled {
        let (sync_event_sender, sync_events) = sync::channel();

        let tracker = Arc::new(Tracker::new(
            config,
            stats_event_sender,
            stats_repository,
            Some(sync_event_sender),
        ));

        (tracker, Some(sync_events))
    } else {
        let tracker = Arc::new(Tracker::new(config, stats_event_sender, stats_repository, None));

        (tracker, None)
    }
}
