//! Structs to collect and keep tracker metrics.
//!
//! The tracker collects metrics such as:
//!
//! - Number of connections handled
//! - Number of `announce` requests handled
//! - Number of `scrape` request handled
//!
//! Request metrics are collected for each connection type, UDP and HTTP,
//! and for each IP version used by the peers, IPv4 and IPv6. On top of
//! those there are counters for full scrapes, live-sync traffic, denied
//! infohashes and UDP connection-id mismatches (silently dropped requests
//! would otherwise be invisible to operators).
//!
//! The data is collected by using an `event-sender -> event listener` model.
//!
//! The tracker uses a [`statistics::EventSender`](crate::core::statistics::EventSender)
//! instance to send an event. The [`statistics::Keeper`](crate::core::statistics::Keeper)
//! listens to new events and uses the [`statistics::Repo`](crate::core::statistics::Repo)
//! to upgrade and store metrics.
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::{automock, predicate::str};
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard};
use tracing::debug;

const CHANNEL_BUFFER_SIZE: usize = 65_535;

/// An statistics event. It is used to collect tracker metrics.
///
/// - `Tcp` prefix means the event was triggered by the HTTP tracker
/// - `Udp` prefix means the event was triggered by the UDP tracker
/// - `4` or `6` prefixes means the IP version used by the peer
/// - Finally the event suffix is the type of request: `announce`, `scrape` or `connection`
///
/// > NOTE: HTTP trackers do not use `connection` requests.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Tcp4Announce,
    Tcp4Scrape,
    Tcp6Announce,
    Tcp6Scrape,
    Udp4Connect,
    Udp4Announce,
    Udp4Scrape,
    Udp6Connect,
    Udp6Announce,
    Udp6Scrape,
    /// A full scrape (scrape request without infohashes) was served.
    Fullscrape,
    /// An announce or scrape was refused by the access list.
    AccesslistDenied,
    /// Unparsable lines found while loading the access list file.
    AccesslistLinesSkipped { lines: u64 },
    /// A UDP request carried a connection id that did not verify. The
    /// request is dropped without a reply; this counter is the only trace.
    UdpConnectionIdMismatch,
    /// Live-sync records flushed to the multicast group.
    LivesyncSent { records: u64 },
    /// Live-sync records accepted from sibling trackers.
    LivesyncReceived { records: u64 },
}

/// Metrics collected by the tracker.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Total number of TCP (HTTP tracker) connections from IPv4 peers.
    /// Since the HTTP tracker spec does not require a handshake, this metric
    /// increases for every HTTP request.
    pub tcp4_connections_handled: u64,
    /// Total number of TCP (HTTP tracker) `announce` requests from IPv4 peers.
    pub tcp4_announces_handled: u64,
    /// Total number of TCP (HTTP tracker) `scrape` requests from IPv4 peers.
    pub tcp4_scrapes_handled: u64,
    /// Total number of TCP (HTTP tracker) connections from IPv6 peers.
    pub tcp6_connections_handled: u64,
    /// Total number of TCP (HTTP tracker) `announce` requests from IPv6 peers.
    pub tcp6_announces_handled: u64,
    /// Total number of TCP (HTTP tracker) `scrape` requests from IPv6 peers.
    pub tcp6_scrapes_handled: u64,
    /// Total number of UDP (UDP tracker) connections from IPv4 peers.
    pub udp4_connections_handled: u64,
    /// Total number of UDP (UDP tracker) `announce` requests from IPv4 peers.
    pub udp4_announces_handled: u64,
    /// Total number of UDP (UDP tracker) `scrape` requests from IPv4 peers.
    pub udp4_scrapes_handled: u64,
    /// Total number of UDP (UDP tracker) `connection` requests from IPv6 peers.
    pub udp6_connections_handled: u64,
    /// Total number of UDP (UDP tracker) `announce` requests from IPv6 peers.
    pub udp6_announces_handled: u64,
    /// Total number of UDP (UDP tracker) `scrape` requests from IPv6 peers.
    pub udp6_scrapes_handled: u64,
    /// Total number of full scrapes served.
    pub fullscrapes_handled: u64,
    /// Total number of requests refused by the access list.
    pub accesslist_denied_requests: u64,
    /// Total number of unparsable access list lines skipped since startup.
    pub accesslist_lines_skipped: u64,
    /// Total number of UDP requests dropped for a bad connection id.
    pub udp_connection_id_mismatches: u64,
    /// Total number of live-sync records sent to the multicast group.
    pub livesync_records_sent: u64,
    /// Total number of live-sync records received from sibling trackers.
    pub livesync_records_received: u64,
}

/// The service responsible for keeping tracker metrics (listening to statistics events and handle them).
///
/// It actively listen to new statistics events. When it receives a new event
/// it accordingly increases the counters.
pub struct Keeper {
    pub repository: Repo,
}

impl Default for Keeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Keeper {
    #[must_use]
    pub fn new() -> Self {
        Self { repository: Repo::new() }
    }

    #[must_use]
    pub fn new_active_instance() -> (Box<dyn EventSender>, Repo) {
        let mut stats_tracker = Self::new();

        let stats_event_sender = stats_tracker.run_event_listener();

        (stats_event_sender, stats_tracker.repository)
    }

    pub fn run_event_listener(&mut self) -> Box<dyn EventSender> {
        let (sender, receiver) = mpsc::channel::<Event>(CHANNEL_BUFFER_SIZE);

        let stats_repository = self.repository.clone();

        tokio::spawn(async move { event_listener(receiver, stats_repository).await });

        Box::new(Sender { sender })
    }
}

async fn event_listener(mut receiver: mpsc::Receiver<Event>, stats_repository: Repo) {
    while let Some(event) = receiver.recv().await {
        event_handler(event, &stats_repository).await;
    }
}

async fn event_handler(event: Event, stats_repository: &Repo) {
    match event {
        // TCP4
        Event::Tcp4Announce => {
            stats_repository.increase_tcp4_announces().await;
            stats_repository.increase_tcp4_connections().await;
        }
        Event::Tcp4Scrape => {
            stats_repository.increase_tcp4_scrapes().await;
            stats_repository.increase_tcp4_connections().await;
        }

        // TCP6
        Event::Tcp6Announce => {
            stats_repository.increase_tcp6_announces().await;
            stats_repository.increase_tcp6_connections().await;
        }
        Event::Tcp6Scrape => {
            stats_repository.increase_tcp6_scrapes().await;
            stats_repository.increase_tcp6_connections().await;
        }

        // UDP4
        Event::Udp4Connect => {
            stats_repository.increase_udp4_connections().await;
        }
        Event::Udp4Announce => {
            stats_repository.increase_udp4_announces().await;
        }
        Event::Udp4Scrape => {
            stats_repository.increase_udp4_scrapes().await;
        }

        // UDP6
        Event::Udp6Connect => {
            stats_repository.increase_udp6_connections().await;
        }
        Event::Udp6Announce => {
            stats_repository.increase_udp6_announces().await;
        }
        Event::Udp6Scrape => {
            stats_repository.increase_udp6_scrapes().await;
        }

        Event::Fullscrape => {
            stats_repository.increase_fullscrapes().await;
        }
        Event::AccesslistDenied => {
            stats_repository.increase_accesslist_denied().await;
        }
        Event::AccesslistLinesSkipped { lines } => {
            stats_repository.add_accesslist_lines_skipped(lines).await;
        }
        Event::UdpConnectionIdMismatch => {
            stats_repository.increase_udp_connection_id_mismatches().await;
        }
        Event::LivesyncSent { records } => {
            stats_repository.add_livesync_records_sent(records).await;
        }
        Event::LivesyncReceived { records } => {
            stats_repository.add_livesync_records_received(records).await;
        }
    }

    debug!("stats: {:?}", stats_repository.get_stats().await);
}

/// A trait to allow sending statistics events
#[async_trait]
#[cfg_attr(test, automock)]
pub trait EventSender: Sync + Send {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>>;
}

/// An [`statistics::EventSender`](crate::core::statistics::EventSender) implementation.
///
/// It uses a channel sender to send the statistic events. The channel is created by a
/// [`statistics::Keeper`](crate::core::statistics::Keeper)
pub struct Sender {
    sender: mpsc::Sender<Event>,
}

#[async_trait]
impl EventSender for Sender {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>> {
        Some(self.sender.send(event).await)
    }
}

/// A repository for the tracker metrics.
#[derive(Clone)]
pub struct Repo {
    pub stats: Arc<RwLock<Metrics>>,
}

impl Default for Repo {
    fn default() -> Self {
        Self::new()
    }
}

impl Repo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    pub async fn get_stats(&self) -> RwLockReadGuard<'_, Metrics> {
        self.stats.read().await
    }

    pub async fn increase_tcp4_announces(&self) {
        self.stats.write().await.tcp4_announces_handled += 1;
    }

    pub async fn increase_tcp4_connections(&self) {
        self.stats.write().await.tcp4_connections_handled += 1;
    }

    pub async fn increase_tcp4_scrapes(&self) {
        self.stats.write().await.tcp4_scrapes_handled += 1;
    }

    pub async fn increase_tcp6_announces(&self) {
        self.stats.write().await.tcp6_announces_handled += 1;
    }

    pub async fn increase_tcp6_connections(&self) {
        self.stats.write().await.tcp6_connections_handled += 1;
    }

    pub async fn increase_tcp6_scrapes(&self) {
        self.stats.write().await.tcp6_scrapes_handled += 1;
    }

    pub async fn increase_udp4_connections(&self) {
        self.stats.write().await.udp4_connections_handled += 1;
    }

    pub async fn increase_udp4_announces(&self) {
        self.stats.write().await.udp4_announces_handled += 1;
    }

    pub async fn increase_udp4_scrapes(&self) {
        self.stats.write().await.udp4_scrapes_handled += 1;
    }

    pub async fn increase_udp6_connections(&self) {
        self.stats.write().await.udp6_connections_handled += 1;
    }

    pub async fn increase_udp6_announces(&self) {
        self.stats.write().await.udp6_announces_handled += 1;
    }

    pub async fn increase_udp6_scrapes(&self) {
        self.stats.write().await.udp6_scrapes_handled += 1;
    }

    pub async fn increase_fullscrapes(&self) {
        self.stats.write().await.fullscrapes_handled += 1;
    }

    pub async fn increase_accesslist_denied(&self) {
        self.stats.write().await.accesslist_denied_requests += 1;
    }

    pub async fn add_accesslist_lines_skipped(&self, lines: u64) {
        self.stats.write().await.accesslist_lines_skipped += lines;
    }

    pub async fn increase_udp_connection_id_mismatches(&self) {
        self.stats.write().await.udp_connection_id_mismatches += 1;
    }

    pub async fn add_livesync_records_sent(&self, records: u64) {
        self.stats.write().await.livesync_records_sent += records;
    }

    pub async fn add_livesync_records_received(&self, records: u64) {
        self.stats.write().await.livesync_records_received += records;
    }
}
