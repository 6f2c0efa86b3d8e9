//! Integration tests.
//!
//! ```text
//! cargo test --test integration
//! ```
use std::time::Duration;

use swarm_tracker_clock::clock::{Time, Working};

// When running integration tests the clock is the production one, so it
// should track the OS clock.

#[test]
fn it_should_serve_the_os_time_outside_of_unit_tests() {
    let os_now = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap();

    assert!(os_now.as_secs().abs_diff(Working::now().as_secs()) <= 1);
}

#[test]
fn it_should_keep_serving_the_cached_value_between_refreshes() {
    let first = Working::now();
    let second = Working::now();

    // Both reads come from the cache; a refresh in between could only move
    // the clock forward.
    assert!(second >= first && second - first < Duration::from_secs(2));
}
