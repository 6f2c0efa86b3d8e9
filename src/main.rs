use clap::error::ErrorKind;
use clap::Parser;
use swarm_tracker::bootstrap::cli::Args;
use swarm_tracker::servers::signals::process_shutdown_signal;
use swarm_tracker::{app, bootstrap};
use tracing::info;

/// Exit code for fatal startup errors: bad configuration, unreadable
/// files, busy sockets.
const EXIT_FATAL: i32 = 111;

/// Exit code for CLI usage errors.
const EXIT_USAGE: i32 = 1;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(EXIT_USAGE);
        }
    };

    let (config, tracker, sync_events) = match bootstrap::app::setup(&args) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("swarm-tracker: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    };

    let running = match app::start(&config, tracker, sync_events).await {
        Ok(running) => running,
        Err(e) => {
            eprintln!("swarm-tracker: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    };

    process_shutdown_signal().await;

    info!("Shutting down..");

    running.halt().await;

    info!("Goodbye.");
}
