use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_peer_store::entry::EntrySync;
use swarm_tracker_peer_store::repository::Repository;
use swarm_tracker_peer_store::{TorrentsSharded, BUCKET_COUNT, BUCKET_WIDTH};
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer::fixture::PeerBuilder;
use swarm_tracker_primitives::PersistentTorrents;

fn now() -> Duration {
    Duration::from_secs(1_669_397_478)
}

fn window() -> Duration {
    BUCKET_WIDTH * u32::try_from(BUCKET_COUNT).unwrap()
}

fn sample_info_hash() -> InfoHash {
    "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap()
}

fn info_hash_in_shard(shard: u8) -> InfoHash {
    let mut info_hash = InfoHash([0u8; 20]);
    info_hash.0[0] = shard;
    info_hash
}

fn peer_at(host: u8, port: u16) -> swarm_tracker_primitives::peer::Peer {
    PeerBuilder::leecher()
        .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, host)), port))
        .last_updated_on(now())
        .build()
}

#[test]
fn it_should_create_the_torrent_entry_on_the_first_announce() {
    let torrents = TorrentsSharded::default();

    let (_, stats) = torrents.update_torrent_with_peer_and_get_stats(&sample_info_hash(), &peer_at(1, 6881));

    assert_eq!(stats.incomplete, 1);
    assert!(torrents.get(&sample_info_hash()).is_some());
}

#[test]
fn it_should_not_grow_the_swarm_when_the_same_peer_reannounces() {
    let torrents = TorrentsSharded::default();

    let peer = peer_at(1, 6881);
    torrents.update_torrent_with_peer_and_get_stats(&sample_info_hash(), &peer);
    let (_, stats) = torrents.update_torrent_with_peer_and_get_stats(&sample_info_hash(), &peer);

    assert_eq!(stats.complete + stats.incomplete, 1);
}

#[test]
fn it_should_keep_aggregate_metrics_equal_to_the_sum_over_shards() {
    let torrents = TorrentsSharded::default();

    // Torrents spread over different shards, two peers each.
    for shard in [0u8, 7, 130, 255] {
        let info_hash = info_hash_in_shard(shard);
        torrents.update_torrent_with_peer_and_get_stats(&info_hash, &peer_at(shard.max(1), 6881));
        torrents.update_torrent_with_peer_and_get_stats(&info_hash, &peer_at(shard.max(1), 6882));
    }

    let metrics = torrents.get_metrics();

    assert_eq!(metrics.torrents, 4);
    assert_eq!(metrics.complete + metrics.incomplete, 8);
}

#[test]
fn it_should_report_scrape_counts_matching_a_reference_count() {
    let torrents = TorrentsSharded::default();
    let info_hash = sample_info_hash();

    // two seeders, three leechers, one of the seeders completes
    for port in 0..3u16 {
        torrents.update_torrent_with_peer_and_get_stats(&info_hash, &peer_at(1, 6000 + port));
    }
    for port in 0..2u16 {
        let seeder = PeerBuilder::seeder()
            .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 7000 + port))
            .last_updated_on(now())
            .build();
        torrents.update_torrent_with_peer_and_get_stats(&info_hash, &seeder);
    }

    let leecher_that_completes = PeerBuilder::leecher()
        .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 3)), 8000))
        .last_updated_on(now())
        .build();
    torrents.update_torrent_with_peer_and_get_stats(&info_hash, &leecher_that_completes);

    let mut completed = leecher_that_completes;
    completed.event = AnnounceEvent::Completed;
    completed.left = swarm_tracker_primitives::NumberOfBytes(0);
    let (stats_updated, stats) = torrents.update_torrent_with_peer_and_get_stats(&info_hash, &completed);

    assert!(stats_updated);
    assert_eq!(stats.complete, 3, "two seeders plus the completed leecher");
    assert_eq!(stats.incomplete, 3);
    assert_eq!(stats.downloaded, 1);
}

#[test]
fn it_should_import_persistent_download_counters_without_touching_existing_entries() {
    let torrents = TorrentsSharded::default();

    torrents.update_torrent_with_peer_and_get_stats(&sample_info_hash(), &peer_at(1, 6881));

    let mut persistent = PersistentTorrents::new();
    persistent.insert(sample_info_hash(), 42);
    persistent.insert(info_hash_in_shard(9), 7);

    torrents.import_persistent(&persistent);

    // The live entry keeps its own counter; the unknown one is created.
    let existing = torrents.get(&sample_info_hash()).unwrap();
    assert_eq!(existing.get_swarm_metadata().downloaded, 0);

    let imported = torrents.get(&info_hash_in_shard(9)).unwrap();
    assert_eq!(imported.get_swarm_metadata().downloaded, 7);
}

#[test]
fn it_should_drop_expired_peers_and_collect_empty_torrents_on_sweep() {
    let torrents = TorrentsSharded::default();
    let policy = TrackerPolicy::new(true, false);

    torrents.update_torrent_with_peer_and_get_stats(&sample_info_hash(), &peer_at(1, 6881));

    torrents.sweep(now() + window(), &policy);

    assert!(torrents.get(&sample_info_hash()).is_none());
    assert_eq!(torrents.get_metrics().torrents, 0);
}

#[test]
fn it_should_keep_torrents_with_a_persisted_download_counter_on_sweep() {
    let torrents = TorrentsSharded::default();
    let policy = TrackerPolicy::new(true, true);

    let mut persistent = PersistentTorrents::new();
    persistent.insert(sample_info_hash(), 42);
    torrents.import_persistent(&persistent);

    torrents.sweep(now() + window(), &policy);

    assert!(torrents.get(&sample_info_hash()).is_some());
}

#[test]
fn it_should_stream_a_full_scrape_as_per_shard_chunks() {
    let torrents = TorrentsSharded::default();

    for shard in [0u8, 7, 130, 255] {
        torrents.update_torrent_with_peer_and_get_stats(&info_hash_in_shard(shard), &peer_at(shard.max(1), 6881));
    }

    let mut collected = 0;
    for shard in 0..swarm_tracker_peer_store::SHARD_COUNT {
        collected += torrents.get_shard_metadata(shard).len();
    }

    assert_eq!(collected, 4);
    assert_eq!(torrents.get_shard_metadata(0).len(), 1);
    assert_eq!(torrents.get_shard_metadata(1).len(), 0);
}

#[test]
fn it_should_settle_to_the_same_state_under_concurrent_announces() {
    let torrents = Arc::new(TorrentsSharded::default());

    let handles: Vec<_> = (0..4u16)
        .map(|worker| {
            let torrents = torrents.clone();
            std::thread::spawn(move || {
                for i in 0..250u16 {
                    let info_hash = info_hash_in_shard(u8::try_from(i % 16).unwrap());
                    let peer = peer_at(u8::try_from(worker + 1).unwrap(), 6000 + i);
                    torrents.update_torrent_with_peer_and_get_stats(&info_hash, &peer);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every (worker, port) pair is a distinct peer address; replaying the
    // announces in any serial order would leave the same totals.
    let metrics = torrents.get_metrics();
    assert_eq!(metrics.torrents, 16);
    assert_eq!(metrics.complete + metrics.incomplete, 1000);
}
