//! Shutdown plumbing for the servers.
//!
//! Two things can stop a running service: the whole process shutting down
//! (`ctrl-c` or `SIGTERM`), or its own halt channel, which the main
//! application holds one sender of per socket-owning job.
use tokio::sync::oneshot;
use tracing::info;

/// Why a service is being asked to stop.
#[derive(Copy, Clone, Debug, derive_more::Display, PartialEq, Eq)]
pub enum Halt {
    /// An orderly stop, requested through the halt channel.
    Normal,
    /// The halt channel owner went away; stop anyway.
    Dropped,
}

/// Resolves when the process receives `ctrl-c` or, on unix, `SIGTERM`.
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed.
pub async fn process_shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}

/// Resolves when the service's halt channel fires or the whole process is
/// shutting down, then logs `message`.
///
/// A dropped halt channel counts as [`Halt::Dropped`] rather than an
/// error, so a service can never outlive the application that spawned it.
pub async fn wait_for_halt(rx_halt: oneshot::Receiver<Halt>, message: String) {
    tokio::select! {
        halt = rx_halt => {
            info!("Halt signal processed: {}", halt.unwrap_or(Halt::Dropped));
        }
        () = process_shutdown_signal() => {
            info!("Process shutdown signal processed");
        }
    }

    info!("{message}");
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::{wait_for_halt, Halt};

    #[tokio::test]
    async fn it_should_resolve_when_the_halt_channel_fires() {
        let (tx_halt, rx_halt) = oneshot::channel::<Halt>();

        tx_halt.send(Halt::Normal).unwrap();

        wait_for_halt(rx_halt, "halted".to_owned()).await;
    }

    #[tokio::test]
    async fn it_should_resolve_when_the_halt_channel_is_dropped() {
        let (tx_halt, rx_halt) = oneshot::channel::<Halt>();

        drop(tx_halt);

        wait_for_halt(rx_halt, "halted".to_owned()).await;
    }
}
