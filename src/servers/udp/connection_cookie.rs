//! Logic for generating and verifying connection IDs.
//!
//! The UDP tracker requires the client to connect to the server before it
//! can send any data. The server responds with a 64-bit connection id that
//! the client must replay in every request. Requests whose connection id
//! does not verify are dropped without an answer; since the id can only be
//! learned at the client's real address, a spoofed source cannot use the
//! tracker to reflect traffic.
//!
//! The naive implementation would store a random id per client in a hash
//! table. Instead the id is *derived*, so verification needs no state:
//!
//! ```text
//! connection id = hash(client IP, time slot, instance secret)
//! ```
//!
//! Time slots are [`ROTATION_INTERVAL`] wide. Both the current and the
//! previous slot verify, so every id stays valid for at least one full
//! interval and at most two:
//!
//! ```text
//! Timestamp (seconds from Unix epoch):
//! |------------|------------|------------|------------|
//! 0            120          240          360          480
//! Slots:
//! |------------|------------|------------|------------|
//! 0            1            2            3            4
//! Peer A connects at timestamp 130 (slot 1) -> id valid until timestamp 360
//! Peer B connects at timestamp 239 (slot 1) -> id valid until timestamp 360
//! ```
//!
//! The instance secret is random per process start (zeroed under test),
//! so connection ids die with the process that minted them.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::panic::Location;
use std::time::Duration;

use swarm_tracker_clock::clock::Time;

use super::error::Error;
use super::protocol::ConnectionId;
use crate::shared::crypto::current_seed;
use crate::CurrentClock;

pub type Cookie = [u8; 8];

/// How often the derived connection ids roll over.
pub const ROTATION_INTERVAL: Duration = Duration::from_secs(120);

/// Converts a connection ID into a connection cookie.
#[must_use]
pub fn from_connection_id(connection_id: &ConnectionId) -> Cookie {
    connection_id.0.to_be_bytes()
}

/// Converts a connection cookie into a connection ID.
#[must_use]
pub fn into_connection_id(connection_cookie: &Cookie) -> ConnectionId {
    ConnectionId(i64::from_be_bytes(*connection_cookie))
}

/// Generates the connection cookie for the current time slot.
#[must_use]
pub fn make(remote_ip: &IpAddr) -> Cookie {
    build(remote_ip, current_slot())
}

/// Checks if the supplied `connection_cookie` is valid: it must match the
/// current or the previous time slot for the remote IP.
///
/// # Errors
///
/// Will return an `Error::InvalidConnectionId` if the cookie matches
/// neither slot.
pub fn check(remote_ip: &IpAddr, connection_cookie: &Cookie) -> Result<(), Error> {
    let slot = current_slot();

    if *connection_cookie == build(remote_ip, slot) {
        return Ok(());
    }

    // Rollover: ids minted just before the slot boundary stay valid.
    if slot > 0 && *connection_cookie == build(remote_ip, slot - 1) {
        return Ok(());
    }

    Err(Error::InvalidConnectionId {
        location: Location::caller(),
    })
}

fn current_slot() -> u64 {
    CurrentClock::now().as_secs() / ROTATION_INTERVAL.as_secs()
}

/// Only the IP goes into the hash, not the port: NATed clients may
/// announce from a different source port than they connected from.
fn build(remote_ip: &IpAddr, slot: u64) -> Cookie {
    let seed = current_seed();

    let mut hasher = DefaultHasher::new();

    remote_ip.hash(&mut hasher);
    slot.hash(&mut hasher);
    seed.hash(&mut hasher);

    hasher.finish().to_be_bytes()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    use swarm_tracker_clock::clock::stopped::Stopped as _;
    use swarm_tracker_clock::clock::{self};

    use super::{build, check, make, ROTATION_INTERVAL};

    fn remote_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1))
    }

    #[test]
    fn it_should_make_the_same_connection_cookie_for_the_same_input_data() {
        let cookie = build(&remote_ip(), 0);
        let cookie_2 = build(&remote_ip(), 0);

        assert_eq!(cookie, cookie_2);
    }

    #[test]
    fn it_should_make_a_different_connection_cookie_for_a_different_ip() {
        let cookie = build(&remote_ip(), 0);
        let cookie_2 = build(&IpAddr::V4(Ipv4Addr::BROADCAST), 0);

        assert_ne!(cookie, cookie_2);
    }

    #[test]
    fn it_should_make_a_different_connection_cookie_for_a_different_ip_version() {
        let cookie = build(&IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
        let cookie_2 = build(&IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0);

        assert_ne!(cookie, cookie_2);
    }

    #[test]
    fn it_should_make_a_different_connection_cookie_for_a_different_time_slot() {
        let cookie = build(&remote_ip(), 0);
        let cookie_2 = build(&remote_ip(), 1);

        assert_ne!(cookie, cookie_2);
    }

    #[test]
    fn it_should_be_valid_for_the_slot_it_was_made_in() {
        clock::Stopped::local_set_to_unix_epoch();

        let cookie = make(&remote_ip());

        check(&remote_ip(), &cookie).unwrap();
    }

    #[test]
    fn it_should_be_valid_until_the_end_of_the_next_slot() {
        clock::Stopped::local_set_to_unix_epoch();

        let cookie = make(&remote_ip());

        clock::Stopped::local_add(&(ROTATION_INTERVAL * 2 - Duration::from_secs(1))).unwrap();

        check(&remote_ip(), &cookie).unwrap();
    }

    #[test]
    fn it_should_not_be_valid_two_slots_later() {
        clock::Stopped::local_set_to_unix_epoch();

        let cookie = make(&remote_ip());

        clock::Stopped::local_add(&(ROTATION_INTERVAL * 2)).unwrap();

        assert!(check(&remote_ip(), &cookie).is_err());
    }

    #[test]
    fn it_should_not_be_valid_for_another_ip() {
        clock::Stopped::local_set_to_unix_epoch();

        let cookie = make(&remote_ip());

        assert!(check(&IpAddr::V4(Ipv4Addr::BROADCAST), &cookie).is_err());
    }
}
