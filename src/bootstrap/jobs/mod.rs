//! Application jobs launchers.
//!
//! The main application process starts a bunch of independent jobs:
//!
//! - One per enabled HTTP and UDP tracker listener.
//! - The live-sync sender and receiver, when enabled.
//! - The peer store cleanup timer.
//! - The cached clock refresh timer.
//! - The access list reload signal watcher.
//!
//! Every socket-owning job gets a `oneshot` halt channel so the main
//! process can stop it gracefully; the timers just die with the process.
pub mod accesslist_reload;
pub mod clock_refresh;
pub mod http_tracker;
pub mod livesync;
pub mod torrent_cleanup;
pub mod udp_tracker;
