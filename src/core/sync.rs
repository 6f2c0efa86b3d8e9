//! The live-sync emission hook of the core tracker.
//!
//! Qualifying peer events (announces that change swarm state and did not
//! themselves arrive through live-sync) are pushed into a bounded channel
//! as [`PeerEvent`]s. The [live-sync server](crate::servers::livesync)
//! owns the receiving end, batches the records and fans them out to the
//! multicast group.
//!
//! The same `event-sender` pattern as the [statistics](crate::core::statistics)
//! module: the core stays free of sockets and the channel decouples the
//! announce hot path from network back-pressure. When the channel is full
//! the event is dropped; live-sync is best-effort and the peer will
//! re-announce within one interval.
use async_trait::async_trait;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;
use tokio::sync::mpsc;

const CHANNEL_BUFFER_SIZE: usize = 65_535;

/// One peer delta to replicate to sibling trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerEvent {
    pub info_hash: InfoHash,
    pub peer: peer::Peer,
}

/// A trait to allow sending live-sync peer events.
#[async_trait]
pub trait EventSender: Sync + Send {
    async fn send_event(&self, event: PeerEvent);
}

/// A channel-backed [`EventSender`].
pub struct Sender {
    sender: mpsc::Sender<PeerEvent>,
}

#[async_trait]
impl EventSender for Sender {
    async fn send_event(&self, event: PeerEvent) {
        // try_send: never let a slow multicast socket stall announces.
        drop(self.sender.try_send(event));
    }
}

/// Creates the event channel: the boxed sender goes into the tracker, the
/// receiver into the live-sync sender task.
#[must_use]
pub fn channel() -> (Box<dyn EventSender>, mpsc::Receiver<PeerEvent>) {
    let (sender, receiver) = mpsc::channel::<PeerEvent>(CHANNEL_BUFFER_SIZE);

    (Box::new(Sender { sender }), receiver)
}
