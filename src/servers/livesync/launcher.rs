//! Logic to start the live-sync sender and receiver tasks.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use swarm_tracker_clock::clock::Time;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::packet::{SyncPacket, SyncRecord, PACKET_SIZE_BUDGET};
use super::LIVESYNC_LOG_TARGET;
use crate::core::access_list::Permissions;
use crate::core::sync::PeerEvent;
use crate::core::{statistics, Tracker};
use crate::servers::signals::{wait_for_halt, Halt};
use crate::shared::crypto::current_seed;
use crate::CurrentClock;

/// The id this instance stamps on its outgoing packets, derived from the
/// ephemeral instance seed. Used to skip our own multicast echo.
#[must_use]
pub fn instance_id() -> u32 {
    let seed = current_seed();
    u32::from_ne_bytes([seed[0], seed[1], seed[2], seed[3]])
}

/// Joins the multicast group and spawns the sender and receiver tasks.
///
/// # Errors
///
/// Will return `Err` if the multicast address is invalid or the socket
/// cannot be bound or joined to the group.
pub async fn start(
    multicast_address: &str,
    flush_interval: Duration,
    tracker: Arc<Tracker>,
    events: mpsc::Receiver<PeerEvent>,
    rx_halt: tokio::sync::oneshot::Receiver<Halt>,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let group_addr: SocketAddr = multicast_address
        .parse()
        .with_context(|| format!("invalid live-sync multicast address: {multicast_address}"))?;

    let IpAddr::V4(group_ip) = group_addr.ip() else {
        bail!("live-sync multicast group must be an IPv4 address: {group_addr}");
    };

    if !group_ip.is_multicast() {
        bail!("live-sync address is not a multicast group: {group_addr}");
    }

    let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), group_addr.port()))
        .await
        .with_context(|| format!("could not bind live-sync socket on port {}", group_addr.port()))?;

    socket
        .join_multicast_v4(group_ip, Ipv4Addr::UNSPECIFIED)
        .with_context(|| format!("could not join live-sync multicast group {group_ip}"))?;

    // Cluster nodes are on the same segment; one hop is enough.
    socket.set_multicast_loop_v4(false).context("could not disable multicast loop")?;

    let address = socket.local_addr().context("could not get local address")?;
    let socket = Arc::new(socket);

    info!(target: LIVESYNC_LOG_TARGET, "Joined multicast group {group_addr}, instance id {:#010x}", instance_id());

    let sender = tokio::spawn(send_loop(
        socket.clone(),
        group_addr,
        flush_interval,
        tracker.clone(),
        events,
    ));
    let receiver = tokio::spawn(receive_loop(socket, tracker));

    let handle = tokio::spawn(async move {
        wait_for_halt(rx_halt, format!("Halting live-sync on group {group_addr}")).await;

        sender.abort();
        receiver.abort();
    });

    Ok((address, handle))
}

/// Buffers peer events and flushes them as one packet when the next
/// record would cross the MTU budget, or when the flush interval ticks.
async fn send_loop(
    socket: Arc<UdpSocket>,
    group_addr: SocketAddr,
    flush_interval: Duration,
    tracker: Arc<Tracker>,
    mut events: mpsc::Receiver<PeerEvent>,
) {
    let mut interval = tokio::time::interval(flush_interval);
    let mut records: Vec<SyncRecord> = vec![];

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    // the tracker dropped its sender; flush what is left and stop
                    flush(&socket, group_addr, &tracker, &mut records).await;
                    break;
                };

                records.push(SyncRecord::from(event));

                if SyncPacket::encoded_size(records.len() + 1) > PACKET_SIZE_BUDGET {
                    flush(&socket, group_addr, &tracker, &mut records).await;
                }
            }
            _ = interval.tick() => {
                flush(&socket, group_addr, &tracker, &mut records).await;
            }
        }
    }
}

async fn flush(socket: &UdpSocket, group_addr: SocketAddr, tracker: &Arc<Tracker>, records: &mut Vec<SyncRecord>) {
    if records.is_empty() {
        return;
    }

    let packet = SyncPacket::new(instance_id(), std::mem::take(records));
    let record_count = packet.records.len() as u64;

    debug!(target: LIVESYNC_LOG_TARGET, "flushing {record_count} records to {group_addr}");

    // best-effort; siblings catch up on the next announce anyway
    drop(socket.send_to(&packet.encode(), group_addr).await);

    tracker
        .send_stats_event(statistics::Event::LivesyncSent { records: record_count })
        .await;
}

/// Receives packets from sibling trackers and replays their records.
async fn receive_loop(socket: Arc<UdpSocket>, tracker: Arc<Tracker>) {
    let mut buffer = [0u8; PACKET_SIZE_BUDGET + 100];

    loop {
        let Ok((payload_len, from)) = socket.recv_from(&mut buffer).await else {
            continue;
        };

        if !tracker.allows(&from.ip(), Permissions::MAY_LIVESYNC) {
            debug!(target: LIVESYNC_LOG_TARGET, "dropping packet from unauthorized node {from}");
            continue;
        }

        let packet = match SyncPacket::decode(&buffer[..payload_len]) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(target: LIVESYNC_LOG_TARGET, "dropping malformed packet from {from}: {e}");
                continue;
            }
        };

        if packet.instance_id == instance_id() {
            continue;
        }

        let now = CurrentClock::now();
        let record_count = packet.records.len() as u64;

        for record in packet.records {
            // Replays never re-emit sync events; that breaks the loop.
            tracker.announce_from_sync(&record.info_hash, &record.to_peer(now));
        }

        tracker
            .send_stats_event(statistics::Event::LivesyncReceived { records: record_count })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swarm_tracker_clock::clock::Time;
    use swarm_tracker_peer_store::entry::EntrySync;
    use swarm_tracker_peer_store::repository::Repository;
    use swarm_tracker_primitives::info_hash::InfoHash;
    use swarm_tracker_test_helpers::configuration;

    use crate::core::services::tracker_factory;
    use crate::servers::livesync::packet::{SyncPacket, SyncRecord};
    use crate::CurrentClock;

    #[tokio::test]
    async fn replaying_a_received_record_should_populate_the_peer_store() {
        let tracker = Arc::new(tracker_factory(&configuration::ephemeral()));

        let record = SyncRecord {
            info_hash: InfoHash([0x69; 20]),
            peer_addr: "126.0.0.1:6881".parse().unwrap(),
            seeder: true,
            completed: false,
            stopped: false,
        };
        let packet = SyncPacket::new(42, vec![record]);

        let now = CurrentClock::now();
        for record in packet.records {
            tracker.announce_from_sync(&record.info_hash, &record.to_peer(now));
        }

        let entry = tracker.torrents.get(&InfoHash([0x69; 20])).unwrap();
        assert_eq!(entry.get_swarm_metadata().complete, 1);
    }
}
