//! Live-sync: UDP multicast replication of peer events between sibling
//! trackers.
//!
//! Trackers behind one DNS name need to agree on the swarms without a
//! shared database. Every tracker multicasts the peer events it handles
//! and replays the events it hears, so all cluster members converge on
//! the same peer sets.
//!
//! Delivery is best-effort and unordered; that is fine because every
//! record is an idempotent move-or-insert and peers re-announce every
//! interval anyway.
//!
//! Loops are broken twice: packets carry the sender's instance id and are
//! skipped by their own sender, and replayed peers never re-emit sync
//! events (see [`announce_from_sync`](crate::core::Tracker::announce_from_sync)).
//!
//! Only packets from IPs holding the live-sync permission are accepted.
pub mod launcher;
pub mod packet;

pub const LIVESYNC_LOG_TARGET: &str = "LIVE SYNC";
