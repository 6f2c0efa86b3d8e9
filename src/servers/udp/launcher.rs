//! Logic to start a new UDP tracker server instance.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::handlers::handle_packet;
use super::{RawRequest, UDP_TRACKER_LOG_TARGET};
use crate::core::Tracker;
use crate::servers::signals::{wait_for_halt, Halt};
use crate::shared::bit_torrent::common::MAX_PACKET_SIZE;

/// Binds the socket and spawns the receive loop with graceful shutdown.
///
/// Each datagram is handled in its own task so a slow shard lock never
/// blocks the socket read.
///
/// # Errors
///
/// Will return `Err` if the socket cannot be bound.
pub async fn start(
    bind_to: SocketAddr,
    tracker: Arc<Tracker>,
    rx_halt: tokio::sync::oneshot::Receiver<Halt>,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let socket = UdpSocket::bind(bind_to)
        .await
        .with_context(|| format!("could not bind udp tracker to socket {bind_to}"))?;

    let address = socket.local_addr().context("could not get local address")?;
    let socket = Arc::new(socket);

    info!(target: UDP_TRACKER_LOG_TARGET, "Starting on: udp://{address}");

    let handle = tokio::spawn(async move {
        let halt = wait_for_halt(rx_halt, format!("Halting UDP tracker on: udp://{address}"));

        tokio::select! {
            () = halt => {},
            () = receive_loop(socket, tracker) => {},
        }

        info!(target: UDP_TRACKER_LOG_TARGET, "Stopped server on: udp://{address}");
    });

    Ok((address, handle))
}

async fn receive_loop(socket: Arc<UdpSocket>, tracker: Arc<Tracker>) {
    let mut buffer = [0u8; MAX_PACKET_SIZE];

    loop {
        match socket.recv_from(&mut buffer).await {
            Ok((payload_len, from)) => {
                let udp_request = RawRequest {
                    payload: buffer[..payload_len].to_vec(),
                    from,
                };

                let socket = socket.clone();
                let tracker = tracker.clone();

                tokio::spawn(async move {
                    process_request(udp_request, &tracker, &socket).await;
                });
            }
            Err(e) => {
                // Transient receive errors (e.g. ICMP port unreachable
                // surfaced on some platforms) must not kill the loop.
                error!(target: UDP_TRACKER_LOG_TARGET, "error receiving datagram: {e}");
            }
        }
    }
}

async fn process_request(udp_request: RawRequest, tracker: &Arc<Tracker>, socket: &Arc<UdpSocket>) {
    let from = udp_request.from;

    let Some(response) = handle_packet(&udp_request, tracker).await else {
        return;
    };

    let mut payload = Vec::with_capacity(MAX_PACKET_SIZE);

    match response.write_bytes(&mut payload) {
        Ok(()) => {
            debug!(target: UDP_TRACKER_LOG_TARGET, "sending {} bytes to {from}", payload.len());

            // doesn't matter if it reaches or not
            drop(socket.send_to(&payload, &from).await);
        }
        Err(e) => {
            error!(target: UDP_TRACKER_LOG_TARGET, "error writing response: {e}");
        }
    }
}
