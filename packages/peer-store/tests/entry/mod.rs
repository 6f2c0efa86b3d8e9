use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use swarm_tracker_peer_store::entry::Entry;
use swarm_tracker_peer_store::{EntrySingle, BUCKET_COUNT, BUCKET_WIDTH};
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::peer::fixture::PeerBuilder;
use swarm_tracker_primitives::peer::Id;

fn now() -> Duration {
    Duration::from_secs(1_669_397_478)
}

fn window() -> Duration {
    BUCKET_WIDTH * u32::try_from(BUCKET_COUNT).unwrap()
}

fn addr(host: u8, port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, host)), port)
}

#[test]
fn it_should_count_a_seeder_as_complete() {
    let mut entry = EntrySingle::default();

    entry.upsert_peer(&PeerBuilder::seeder().last_updated_on(now()).build());

    let metadata = entry.get_swarm_metadata();

    assert_eq!((metadata.complete, metadata.incomplete), (1, 0));
}

#[test]
fn it_should_count_a_leecher_as_incomplete() {
    let mut entry = EntrySingle::default();

    entry.upsert_peer(&PeerBuilder::leecher().last_updated_on(now()).build());

    let metadata = entry.get_swarm_metadata();

    assert_eq!((metadata.complete, metadata.incomplete), (0, 1));
}

#[test]
fn it_should_not_increase_the_live_peer_count_when_a_peer_reannounces() {
    let mut entry = EntrySingle::default();

    let peer = PeerBuilder::leecher().last_updated_on(now()).build();

    entry.upsert_peer(&peer);
    entry.upsert_peer(&peer);

    assert_eq!(entry.get_peers_len(), 1);
}

#[test]
fn it_should_remove_the_peer_when_it_stops() {
    let mut entry = EntrySingle::default();

    let peer = PeerBuilder::leecher().last_updated_on(now()).build();
    entry.upsert_peer(&peer);

    let stopped = PeerBuilder::leecher()
        .with_event(AnnounceEvent::Stopped)
        .last_updated_on(now())
        .build();
    entry.upsert_peer(&stopped);

    assert!(entry.peers_is_empty());
    let metadata = entry.get_swarm_metadata();
    assert_eq!((metadata.complete, metadata.incomplete), (0, 0));
}

#[test]
fn it_should_count_a_completed_download_only_for_previously_known_peers() {
    let mut entry = EntrySingle::default();

    // A peer that shows up already completed was never seen downloading,
    // so it does not count.
    let unknown = PeerBuilder::seeder()
        .with_event(AnnounceEvent::Completed)
        .last_updated_on(now())
        .build();
    assert!(!entry.upsert_peer(&unknown));

    // A started peer that later completes counts exactly once.
    let started = PeerBuilder::leecher().last_updated_on(now()).build();
    entry.upsert_peer(&started);

    let completed = PeerBuilder::leecher()
        .with_event(AnnounceEvent::Completed)
        .with_no_bytes_pending_to_download()
        .last_updated_on(now())
        .build();

    assert!(entry.upsert_peer(&completed));
    assert!(!entry.upsert_peer(&completed));

    assert_eq!(entry.get_swarm_metadata().downloaded, 1);
}

#[test]
fn it_should_expire_a_peer_that_has_not_announced_for_a_full_window() {
    let mut entry = EntrySingle::default();

    entry.upsert_peer(&PeerBuilder::leecher().last_updated_on(now()).build());

    entry.rotate_buckets(now() + window());

    assert!(entry.peers_is_empty());
}

#[test]
fn it_should_keep_a_peer_that_announced_within_the_window() {
    let mut entry = EntrySingle::default();

    entry.upsert_peer(&PeerBuilder::leecher().last_updated_on(now()).build());

    entry.rotate_buckets(now() + window() - BUCKET_WIDTH);

    assert_eq!(entry.get_peers_len(), 1);
}

#[test]
fn it_should_return_all_peers_when_the_limit_covers_the_population() {
    let mut entry = EntrySingle::default();

    for port in 0..10u16 {
        entry.upsert_peer(
            &PeerBuilder::leecher()
                .with_peer_addr(&addr(1, 6000 + port))
                .last_updated_on(now())
                .build(),
        );
    }

    assert_eq!(entry.get_peers(Some(50)).len(), 10);
    assert_eq!(entry.get_peers(None).len(), 10);
}

#[test]
fn it_should_return_a_subsample_of_the_requested_size() {
    let mut entry = EntrySingle::default();

    for port in 0..50u16 {
        entry.upsert_peer(
            &PeerBuilder::leecher()
                .with_peer_addr(&addr(1, 6000 + port))
                .last_updated_on(now())
                .build(),
        );
    }

    assert_eq!(entry.get_peers(Some(20)).len(), 20);
}

#[test]
fn it_should_not_return_the_requesting_client_to_itself() {
    let mut entry = EntrySingle::default();

    let client = addr(1, 6881);
    entry.upsert_peer(&PeerBuilder::leecher().with_peer_addr(&client).last_updated_on(now()).build());
    entry.upsert_peer(
        &PeerBuilder::seeder()
            .with_peer_id(&Id(*b"-qB00000000000000009"))
            .with_peer_addr(&addr(2, 6881))
            .last_updated_on(now())
            .build(),
    );

    let peers = entry.get_peers_for_client(&client, Some(50));

    assert_eq!(peers.len(), 1);
    assert!(peers.iter().all(|peer| peer.peer_addr != client));
}

#[test]
fn it_should_keep_the_live_counts_consistent_with_the_peer_list() {
    let mut entry = EntrySingle::default();

    for port in 0..7u16 {
        entry.upsert_peer(
            &PeerBuilder::leecher()
                .with_peer_addr(&addr(1, 6000 + port))
                .last_updated_on(now())
                .build(),
        );
    }
    for port in 0..3u16 {
        entry.upsert_peer(
            &PeerBuilder::seeder()
                .with_peer_addr(&addr(2, 6000 + port))
                .last_updated_on(now())
                .build(),
        );
    }

    let metadata = entry.get_swarm_metadata();

    assert_eq!(
        (metadata.complete + metadata.incomplete) as usize,
        entry.get_peers_len(),
        "live counters must match the stored peers"
    );
}
