//! The core `tracker` module contains the generic `BitTorrent` tracker
//! logic which is independent of the delivery layer.
//!
//! It contains the tracker services and their dependencies. It's a domain
//! layer which does not specify how the end user should connect to the
//! `Tracker`. Typically this module is intended to be used by higher
//! modules like:
//!
//! - A UDP tracker
//! - A HTTP tracker
//! - The live-sync replication server
//!
//! ```text
//! Delivery layer     Domain layer
//!
//!     HTTP tracker |
//!      UDP tracker |> Core tracker
//!        Live-sync |
//! ```
//!
//! The tracker has several groups of responsibilities:
//!
//! - **Core tracker**: it handles the information about torrents and peers.
//! - **Authorization**: when running in `listed` or `blacklisted` mode the
//!   access list gates which infohashes are tracked.
//! - **Permissions**: per-IP grants for the stats endpoints, trusted
//!   proxies and live-sync cluster nodes.
//! - **Statistics**: it keeps and serves the tracker statistics.
//!
//! # Announce
//!
//! Handling `announce` requests is the most important task for a
//! `BitTorrent` tracker. The peer sends its state, the tracker updates the
//! swarm (the in-memory [peer store](swarm_tracker_peer_store)) and
//! answers with a random subset of the other peers in the swarm.
//!
//! The `remote_client_ip` argument is the resolved peer IP. Trackers
//! ignore the IP the peer claims in the request params; resolving the
//! right source (connection address or a trusted `X-Forwarded-For`) is
//! the delivery layer's job.
//!
//! # Scrape
//!
//! The `scrape` request returns aggregate swarm metadata, per infohash:
//!
//! ```text
//! complete:   number of active seeders
//! downloaded: number of completed downloads ever
//! incomplete: number of active leechers
//! ```
//!
//! Infohashes the access list refuses are reported with zeroed metadata,
//! which is what polite `BitTorrent` trackers do instead of erroring.
//!
//! Refer to the `BitTorrent` BEPs for the wire semantics:
//!
//! - [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 23. Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
//! - [BEP 48. Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html)
pub mod access_list;
pub mod error;
pub mod services;
pub mod state_file;
pub mod statistics;
pub mod sync;

use std::collections::HashMap;
use std::net::IpAddr;
use std::panic::Location;
use std::sync::Arc;

use derive_more::Constructor;
use swarm_tracker_clock::clock::Time;
use swarm_tracker_configuration::{AnnouncePolicy, Configuration, TrackerPolicy, MAX_NUMWANT};
use swarm_tracker_peer_store::repository::Repository;
use swarm_tracker_peer_store::TorrentsSharded;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
use swarm_tracker_primitives::{peer, TrackerMode};
use tokio::sync::mpsc::error::SendError;
use tracing::{debug, info};

use self::access_list::{AccessList, IpPermissions, Permissions};
use self::error::Error;
use crate::CurrentClock;

/// The domain layer tracker service.
///
/// Its main responsibility is to handle the `announce` and `scrape`
/// requests. But it's also a container for the tracker configuration,
/// access list, permissions and statistics.
///
/// > **NOTICE**: the `Tracker` is not responsible for handling the
/// > network layer. Typically, the `Tracker` is used by a higher
/// > application service that handles the network layer.
pub struct Tracker {
    announce_policy: AnnouncePolicy,
    mode: TrackerMode,
    policy: TrackerPolicy,
    access_list: AccessList,
    ip_permissions: IpPermissions,
    pub torrents: Arc<TorrentsSharded>,
    stats_event_sender: Option<Box<dyn statistics::EventSender>>,
    stats_repository: statistics::Repo,
    sync_event_sender: Option<Box<dyn sync::EventSender>>,
    external_ip: Option<IpAddr>,
    on_reverse_proxy: bool,
    redirect_url: Option<String>,
    accesslist_path: Option<String>,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Constructor, Default)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<peer::Peer>,
    /// Swarm statistics
    pub stats: SwarmMetadata,
    pub policy: AnnouncePolicy,
}

/// Structure that holds the data returned by the `scrape` request.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct ScrapeData {
    /// A map of infohashes and swarm metadata for each torrent.
    pub files: HashMap<InfoHash, SwarmMetadata>,
}

impl ScrapeData {
    /// Creates a new empty `ScrapeData` with no files (torrents).
    #[must_use]
    pub fn empty() -> Self {
        let files: HashMap<InfoHash, SwarmMetadata> = HashMap::new();
        Self { files }
    }

    /// Creates a new `ScrapeData` with zeroed metadata for each torrent.
    #[must_use]
    pub fn zeroed(info_hashes: &Vec<InfoHash>) -> Self {
        let mut scrape_data = Self::empty();

        for info_hash in info_hashes {
            scrape_data.add_file_with_zeroed_metadata(info_hash);
        }

        scrape_data
    }

    /// Adds a torrent to the `ScrapeData`.
    pub fn add_file(&mut self, info_hash: &InfoHash, swarm_metadata: SwarmMetadata) {
        self.files.insert(*info_hash, swarm_metadata);
    }

    /// Adds a torrent to the `ScrapeData` with zeroed metadata.
    pub fn add_file_with_zeroed_metadata(&mut self, info_hash: &InfoHash) {
        self.files.insert(*info_hash, SwarmMetadata::zeroed());
    }
}

impl Tracker {
    /// `Tracker` constructor.
    #[must_use]
    pub fn new(
        config: &Configuration,
        stats_event_sender: Option<Box<dyn statistics::EventSender>>,
        stats_repository: statistics::Repo,
        sync_event_sender: Option<Box<dyn sync::EventSender>>,
    ) -> Tracker {
        Tracker {
            announce_policy: config.get_announce_policy(),
            mode: config.mode,
            policy: config.get_tracker_policy(),
            access_list: AccessList::default(),
            ip_permissions: IpPermissions::from_config(&config.access),
            torrents: Arc::default(),
            stats_event_sender,
            stats_repository,
            sync_event_sender,
            external_ip: config.get_ext_ip(),
            on_reverse_proxy: config.on_reverse_proxy,
            redirect_url: config.redirect_url.clone(),
            accesslist_path: config.accesslist_path.clone(),
        }
    }

    /// Returns `true` is the tracker is in public mode.
    pub fn is_public(&self) -> bool {
        self.mode == TrackerMode::Public
    }

    /// Returns `true` is the tracker is in whitelisted mode.
    pub fn is_whitelisted(&self) -> bool {
        self.mode == TrackerMode::Listed
    }

    /// Returns `true` is the tracker is in blacklisted mode.
    pub fn is_blacklisted(&self) -> bool {
        self.mode == TrackerMode::Blacklisted
    }

    /// Returns `true` is the tracker is behind a reverse proxy.
    pub fn is_behind_reverse_proxy(&self) -> bool {
        self.on_reverse_proxy
    }

    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.announce_policy
    }

    pub fn get_maybe_external_ip(&self) -> Option<IpAddr> {
        self.external_ip
    }

    /// Where `GET /` redirects to, if anywhere.
    pub fn get_redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Whether the IP holds the given permission bit (or `ADMIN`).
    pub fn allows(&self, ip: &IpAddr, wanted: Permissions) -> bool {
        self.ip_permissions.allows(ip, wanted)
    }

    /// It handles an announce request.
    ///
    /// # Context: Tracker
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// > **NOTICE**: the peer argument is mutable because the tracker
    /// > replaces a loopback peer IP with the configured external IP.
    pub async fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &mut peer::Peer,
        remote_client_ip: &IpAddr,
        peers_wanted: usize,
    ) -> AnnounceData {
        debug!("Before: {peer:?}");
        peer.change_ip(&assign_ip_address_to_peer(remote_client_ip, self.external_ip));
        debug!("After: {peer:?}");

        // we should update the torrent and get the stats before we get the peer list.
        let (_stats_updated, stats) = self.torrents.update_torrent_with_peer_and_get_stats(info_hash, peer);

        let peers = self.get_torrent_peers_for_peer(info_hash, peer, peers_wanted);

        self.send_sync_event(info_hash, peer).await;

        AnnounceData {
            peers,
            stats,
            policy: self.get_announce_policy(),
        }
    }

    /// Replays a peer record received through live-sync.
    ///
    /// A replay is an idempotent move-or-insert: no peer list is built and
    /// no sync event is emitted, which is what breaks multicast loops.
    pub fn announce_from_sync(&self, info_hash: &InfoHash, peer: &peer::Peer) {
        let _ = self.torrents.update_torrent_with_peer_and_get_stats(info_hash, peer);
    }

    /// It handles a scrape request.
    ///
    /// # Context: Tracker
    ///
    /// BEP 48: [Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html).
    pub async fn scrape(&self, info_hashes: &Vec<InfoHash>) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            let swarm_metadata = match self.authorize(info_hash) {
                Ok(()) => self.get_swarm_metadata(info_hash),
                Err(_) => {
                    self.send_stats_event(statistics::Event::AccesslistDenied).await;
                    SwarmMetadata::zeroed()
                }
            };
            scrape_data.add_file(info_hash, swarm_metadata);
        }

        scrape_data
    }

    /// It returns the data for a `scrape` response.
    fn get_swarm_metadata(&self, info_hash: &InfoHash) -> SwarmMetadata {
        use swarm_tracker_peer_store::entry::EntrySync;

        match self.torrents.get(info_hash) {
            Some(torrent_entry) => torrent_entry.get_swarm_metadata(),
            None => SwarmMetadata::default(),
        }
    }

    fn get_torrent_peers_for_peer(&self, info_hash: &InfoHash, peer: &peer::Peer, peers_wanted: usize) -> Vec<peer::Peer> {
        use swarm_tracker_peer_store::entry::EntrySync;

        if peers_wanted == 0 {
            return vec![];
        }

        match self.torrents.get(info_hash) {
            None => vec![],
            Some(entry) => entry.get_peers_for_client(&peer.peer_addr, Some(peers_wanted.min(MAX_NUMWANT))),
        }
    }

    /// Get all torrent peers for a given torrent
    ///
    /// # Context: Tracker
    pub fn get_torrent_peers(&self, info_hash: &InfoHash) -> Vec<peer::Peer> {
        use swarm_tracker_peer_store::entry::EntrySync;

        match self.torrents.get(info_hash) {
            None => vec![],
            Some(entry) => entry.get_peers(Some(MAX_NUMWANT)),
        }
    }

    /// Authorization gate for an infohash, depending on the tracker mode.
    ///
    /// # Context: Authorization
    ///
    /// # Errors
    ///
    /// Will return an error if the infohash is missing from the whitelist
    /// (`listed` mode) or present on the blacklist (`blacklisted` mode).
    pub fn authorize(&self, info_hash: &InfoHash) -> Result<(), Error> {
        match self.mode {
            TrackerMode::Public => Ok(()),
            TrackerMode::Listed => {
                if self.access_list.contains(info_hash) {
                    Ok(())
                } else {
                    Err(Error::TorrentNotOnWhitelist {
                        info_hash: *info_hash,
                        location: Location::caller(),
                    })
                }
            }
            TrackerMode::Blacklisted => {
                if self.access_list.contains(info_hash) {
                    Err(Error::TorrentOnBlacklist {
                        info_hash: *info_hash,
                        location: Location::caller(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Adds an infohash to the in-memory access list directly.
    /// Used by tests and by operators without a list file.
    ///
    /// # Context: Access list
    pub fn add_info_hash_to_access_list(&self, info_hash: &InfoHash) {
        let mut entries: std::collections::HashSet<InfoHash> = std::collections::HashSet::new();
        entries.insert(*info_hash);
        self.access_list.replace(entries);
    }

    /// (Re)loads the access list from the configured file, atomically
    /// swapping the new set in. A no-op when no file is configured.
    ///
    /// # Context: Access list
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configured file cannot be read.
    pub async fn reload_access_list(&self) -> Result<(), std::io::Error> {
        let Some(path) = &self.accesslist_path else {
            return Ok(());
        };

        let parsed = access_list::load_access_list_file(path)?;

        if parsed.skipped_lines > 0 {
            self.send_stats_event(statistics::Event::AccesslistLinesSkipped {
                lines: parsed.skipped_lines,
            })
            .await;
        }

        info!("access list loaded from {}: {} infohashes", path, parsed.entries.len());

        self.access_list.replace(parsed.entries);

        Ok(())
    }

    /// Seeds the per-torrent download counters from the saved-state file.
    ///
    /// # Context: Tracker
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file cannot be read.
    pub fn load_state_file(&self, path: &str) -> Result<(), std::io::Error> {
        let parsed = state_file::load_state_file(path)?;

        info!("saved state loaded from {}: {} torrents", path, parsed.torrents.len());

        self.torrents.import_persistent(&parsed.torrents);

        Ok(())
    }

    /// It calculates and returns the general `Tracker`
    /// [`TorrentsMetrics`]
    ///
    /// # Context: Tracker
    pub fn get_torrents_metrics(&self) -> TorrentsMetrics {
        self.torrents.get_metrics()
    }

    /// The periodic sweep: advance every bucket ring (reclaiming expired
    /// peers) and collect torrents the policy no longer keeps.
    ///
    /// # Context: Tracker
    pub fn cleanup_torrents(&self) {
        self.torrents.sweep(CurrentClock::now(), &self.policy);
    }

    /// It return the `Tracker` [`statistics::Metrics`].
    ///
    /// # Context: Statistics
    pub async fn get_stats(&self) -> tokio::sync::RwLockReadGuard<'_, statistics::Metrics> {
        self.stats_repository.get_stats().await
    }

    /// It allows to send a statistic events which eventually will be used to update [`statistics::Metrics`].
    ///
    /// # Context: Statistics
    pub async fn send_stats_event(&self, event: statistics::Event) -> Option<Result<(), SendError<statistics::Event>>> {
        match &self.stats_event_sender {
            None => None,
            Some(stats_event_sender) => stats_event_sender.send_event(event).await,
        }
    }

    async fn send_sync_event(&self, info_hash: &InfoHash, peer: &peer::Peer) {
        if let Some(sync_event_sender) = &self.sync_event_sender {
            sync_event_sender
                .send_event(sync::PeerEvent {
                    info_hash: *info_hash,
                    peer: *peer,
                })
                .await;
        }
    }
}

#[must_use]
fn assign_ip_address_to_peer(remote_client_ip: &IpAddr, tracker_external_ip: Option<IpAddr>) -> IpAddr {
    if let Some(host_ip) = tracker_external_ip.filter(|_| remote_client_ip.is_loopback()) {
        host_ip
    } else {
        *remote_client_ip
    }
}

#[cfg(test)]
mod tests {

    mod the_tracker {

        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        use std::str::FromStr;

        use swarm_tracker_primitives::announce_event::AnnounceEvent;
        use swarm_tracker_primitives::info_hash::InfoHash;
        use swarm_tracker_primitives::peer::{self, Peer};
        use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
        use swarm_tracker_primitives::{DurationSinceUnixEpoch, NumberOfBytes};
        use swarm_tracker_test_helpers::configuration;

        use crate::core::services::tracker_factory;
        use crate::core::Tracker;

        const PEERS_WANTED: usize = 50;

        fn public_tracker() -> Tracker {
            tracker_factory(&configuration::ephemeral_mode_public())
        }

        fn whitelisted_tracker() -> Tracker {
            tracker_factory(&configuration::ephemeral_mode_whitelisted())
        }

        fn blacklisted_tracker() -> Tracker {
            tracker_factory(&configuration::ephemeral_mode_blacklisted())
        }

        fn sample_info_hash() -> InfoHash {
            "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()
        }

        // The client peer IP
        fn peer_ip() -> IpAddr {
            IpAddr::V4(Ipv4Addr::from_str("126.0.0.1").unwrap())
        }

        /// Sample peer whose state is not relevant for the tests
        fn sample_peer() -> Peer {
            complete_peer()
        }

        /// Sample peer when for tests that need more than one peer
        fn sample_peer_1() -> Peer {
            Peer {
                peer_id: peer::Id(*b"-qB00000000000000001"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8081),
                updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0),
                event: AnnounceEvent::Completed,
            }
        }

        /// Sample peer when for tests that need more than one peer
        fn sample_peer_2() -> Peer {
            Peer {
                peer_id: peer::Id(*b"-qB00000000000000002"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 8082),
                updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0),
                event: AnnounceEvent::Completed,
            }
        }

        fn seeder() -> Peer {
            complete_peer()
        }

        fn leecher() -> Peer {
            incomplete_peer()
        }

        fn started_peer() -> Peer {
            incomplete_peer()
        }

        fn completed_peer() -> Peer {
            complete_peer()
        }

        /// A peer that counts as `complete` in swarm metadata
        /// IMPORTANT!: it only counts for `downloaded` if it was announced
        /// at least once before announcing the `AnnounceEvent::Completed`
        /// event.
        fn complete_peer() -> Peer {
            Peer {
                peer_id: peer::Id(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(0), // No bytes left to download
                event: AnnounceEvent::Completed,
            }
        }

        /// A peer that counts as `incomplete` in swarm metadata
        fn incomplete_peer() -> Peer {
            Peer {
                peer_id: peer::Id(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                uploaded: NumberOfBytes(0),
                downloaded: NumberOfBytes(0),
                left: NumberOfBytes(1000), // Still bytes to download
                event: AnnounceEvent::Started,
            }
        }

        #[tokio::test]
        async fn should_collect_torrent_metrics() {
            let tracker = public_tracker();

            let torrents_metrics = tracker.get_torrents_metrics();

            assert_eq!(
                torrents_metrics,
                TorrentsMetrics {
                    complete: 0,
                    downloaded: 0,
                    incomplete: 0,
                    torrents: 0
                }
            );
        }

        #[tokio::test]
        async fn it_should_return_all_the_peers_for_a_given_torrent() {
            let tracker = public_tracker();

            let info_hash = sample_info_hash();
            let mut peer = sample_peer();

            tracker.announce(&info_hash, &mut peer, &peer_ip(), PEERS_WANTED).await;

            let peers = tracker.get_torrent_peers(&info_hash);

            assert_eq!(peers, vec![peer]);
        }

        mod handling_an_announce_request {

            use crate::core::tests::the_tracker::{
                peer_ip, public_tracker, sample_info_hash, sample_peer, sample_peer_1, sample_peer_2, PEERS_WANTED,
            };

            mod should_assign_the_ip_to_the_peer {

                use std::net::{IpAddr, Ipv4Addr};

                use crate::core::assign_ip_address_to_peer;

                #[test]
                fn using_the_source_ip_instead_of_the_ip_in_the_announce_request() {
                    let remote_ip = IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2));

                    let peer_ip = assign_ip_address_to_peer(&remote_ip, None);

                    assert_eq!(peer_ip, remote_ip);
                }

                mod and_when_the_client_ip_is_a_loopback_ip {

                    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
                    use std::str::FromStr;

                    use crate::core::assign_ip_address_to_peer;

                    #[test]
                    fn it_should_use_the_loopback_ip_if_the_tracker_does_not_have_the_external_ip_configuration() {
                        let remote_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

                        let peer_ip = assign_ip_address_to_peer(&remote_ip, None);

                        assert_eq!(peer_ip, remote_ip);
                    }

                    #[test]
                    fn it_should_use_the_external_tracker_ip_in_tracker_configuration_if_it_is_defined() {
                        let remote_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

                        let tracker_external_ip = IpAddr::V4(Ipv4Addr::from_str("126.0.0.1").unwrap());

                        let peer_ip = assign_ip_address_to_peer(&remote_ip, Some(tracker_external_ip));

                        assert_eq!(peer_ip, tracker_external_ip);
                    }

                    #[test]
                    fn it_should_use_the_external_ip_even_if_it_is_an_ipv6_ip() {
                        let remote_ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

                        let tracker_external_ip =
                            IpAddr::V6(Ipv6Addr::from_str("2345:0425:2CA1:0000:0000:0567:5673:23b5").unwrap());

                        let peer_ip = assign_ip_address_to_peer(&remote_ip, Some(tracker_external_ip));

                        assert_eq!(peer_ip, tracker_external_ip);
                    }
                }
            }

            #[tokio::test]
            async fn it_should_return_the_announce_data_with_an_empty_peer_list_when_it_is_the_first_announced_peer() {
                let tracker = public_tracker();

                let mut peer = sample_peer();

                let announce_data = tracker.announce(&sample_info_hash(), &mut peer, &peer_ip(), PEERS_WANTED).await;

                assert_eq!(announce_data.peers, vec![]);
            }

            #[tokio::test]
            async fn it_should_return_the_announce_data_with_the_previously_announced_peers() {
                let tracker = public_tracker();

                let mut previously_announced_peer = sample_peer_1();
                tracker
                    .announce(&sample_info_hash(), &mut previously_announced_peer, &peer_ip(), PEERS_WANTED)
                    .await;

                let mut peer = sample_peer_2();
                let announce_data = tracker.announce(&sample_info_hash(), &mut peer, &peer_ip(), PEERS_WANTED).await;

                assert_eq!(announce_data.peers, vec![previously_announced_peer]);
            }

            #[tokio::test]
            async fn it_should_not_return_any_peers_when_the_client_wants_none() {
                let tracker = public_tracker();

                let mut previously_announced_peer = sample_peer_1();
                tracker
                    .announce(&sample_info_hash(), &mut previously_announced_peer, &peer_ip(), PEERS_WANTED)
                    .await;

                let mut peer = sample_peer_2();
                let announce_data = tracker.announce(&sample_info_hash(), &mut peer, &peer_ip(), 0).await;

                assert_eq!(announce_data.peers, vec![]);
            }

            mod it_should_update_the_swarm_stats_for_the_torrent {

                use crate::core::tests::the_tracker::{
                    completed_peer, leecher, peer_ip, public_tracker, sample_info_hash, seeder, started_peer, PEERS_WANTED,
                };

                #[tokio::test]
                async fn when_the_peer_is_a_seeder() {
                    let tracker = public_tracker();

                    let mut peer = seeder();

                    let announce_data = tracker.announce(&sample_info_hash(), &mut peer, &peer_ip(), PEERS_WANTED).await;

                    assert_eq!(announce_data.stats.complete, 1);
                }

                #[tokio::test]
                async fn when_the_peer_is_a_leecher() {
                    let tracker = public_tracker();

                    let mut peer = leecher();

                    let announce_data = tracker.announce(&sample_info_hash(), &mut peer, &peer_ip(), PEERS_WANTED).await;

                    assert_eq!(announce_data.stats.incomplete, 1);
                }

                #[tokio::test]
                async fn when_a_previously_announced_started_peer_has_completed_downloading() {
                    let tracker = public_tracker();

                    // We have to announce with "started" event because peer does not count if peer was not previously known
                    let mut started_peer = started_peer();
                    tracker
                        .announce(&sample_info_hash(), &mut started_peer, &peer_ip(), PEERS_WANTED)
                        .await;

                    let mut completed_peer = completed_peer();
                    let announce_data = tracker
                        .announce(&sample_info_hash(), &mut completed_peer, &peer_ip(), PEERS_WANTED)
                        .await;

                    assert_eq!(announce_data.stats.downloaded, 1);
                }
            }
        }

        mod handling_a_scrape_request {

            use std::net::{IpAddr, Ipv4Addr};

            use swarm_tracker_primitives::info_hash::InfoHash;
            use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;

            use crate::core::tests::the_tracker::{complete_peer, incomplete_peer, public_tracker, PEERS_WANTED};
            use crate::core::ScrapeData;

            #[tokio::test]
            async fn it_should_return_a_zeroed_swarm_metadata_for_the_requested_file_if_the_tracker_does_not_have_that_torrent() {
                let tracker = public_tracker();

                let info_hashes = vec!["3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()];

                let scrape_data = tracker.scrape(&info_hashes).await;

                let mut expected_scrape_data = ScrapeData::empty();

                expected_scrape_data.add_file_with_zeroed_metadata(&info_hashes[0]);

                assert_eq!(scrape_data, expected_scrape_data);
            }

            #[tokio::test]
            async fn it_should_return_the_swarm_metadata_for_the_requested_file_if_the_tracker_has_that_torrent() {
                let tracker = public_tracker();

                let info_hash = "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap();

                // Announce a "complete" peer for the torrent
                let mut complete_peer = complete_peer();
                tracker
                    .announce(
                        &info_hash,
                        &mut complete_peer,
                        &IpAddr::V4(Ipv4Addr::new(126, 0, 0, 10)),
                        PEERS_WANTED,
                    )
                    .await;

                // Announce an "incomplete" peer for the torrent
                let mut incomplete_peer = incomplete_peer();
                incomplete_peer.peer_addr.set_port(8081);
                tracker
                    .announce(
                        &info_hash,
                        &mut incomplete_peer,
                        &IpAddr::V4(Ipv4Addr::new(126, 0, 0, 11)),
                        PEERS_WANTED,
                    )
                    .await;

                // Scrape
                let scrape_data = tracker.scrape(&vec![info_hash]).await;

                // The expected swarm metadata for the file
                let mut expected_scrape_data = ScrapeData::empty();
                expected_scrape_data.add_file(
                    &info_hash,
                    SwarmMetadata {
                        complete: 1,
                        downloaded: 0,
                        incomplete: 1,
                    },
                );

                assert_eq!(scrape_data, expected_scrape_data);
            }
        }

        mod configured_as_whitelisted {

            use crate::core::tests::the_tracker::{sample_info_hash, whitelisted_tracker};

            #[tokio::test]
            async fn it_should_authorize_the_announce_and_scrape_actions_on_whitelisted_torrents() {
                let tracker = whitelisted_tracker();

                tracker.add_info_hash_to_access_list(&sample_info_hash());

                assert!(tracker.authorize(&sample_info_hash()).is_ok());
            }

            #[tokio::test]
            async fn it_should_not_authorize_the_announce_and_scrape_actions_on_not_whitelisted_torrents() {
                let tracker = whitelisted_tracker();

                assert!(tracker.authorize(&sample_info_hash()).is_err());
            }
        }

        mod configured_as_blacklisted {

            use crate::core::tests::the_tracker::{blacklisted_tracker, sample_info_hash};

            #[tokio::test]
            async fn it_should_not_authorize_blacklisted_torrents() {
                let tracker = blacklisted_tracker();

                tracker.add_info_hash_to_access_list(&sample_info_hash());

                assert!(tracker.authorize(&sample_info_hash()).is_err());
            }

            #[tokio::test]
            async fn it_should_authorize_torrents_that_are_not_on_the_blacklist() {
                let tracker = blacklisted_tracker();

                assert!(tracker.authorize(&sample_info_hash()).is_ok());
            }
        }

        mod loading_the_saved_state {

            use swarm_tracker_peer_store::entry::EntrySync;
            use swarm_tracker_peer_store::repository::Repository;

            use crate::core::tests::the_tracker::{public_tracker, sample_info_hash};

            #[tokio::test]
            async fn it_should_seed_the_download_counters_from_a_state_file() {
                let tracker = public_tracker();

                let temp_file = std::env::temp_dir().join(format!(
                    "state_{}.txt",
                    swarm_tracker_test_helpers::random::string(16)
                ));
                std::fs::write(&temp_file, "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0:5:42\n").unwrap();

                tracker.load_state_file(temp_file.to_str().unwrap()).unwrap();

                let entry = tracker.torrents.get(&sample_info_hash()).unwrap();
                assert_eq!(entry.get_swarm_metadata().downloaded, 42);

                std::fs::remove_file(temp_file).unwrap();
            }
        }
    }
}
