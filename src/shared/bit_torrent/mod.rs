//! `BitTorrent` protocol primitives shared by the HTTP and UDP trackers.
pub mod common;
