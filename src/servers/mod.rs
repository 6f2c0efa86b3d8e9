//! Servers: the delivery layers on top of the [core tracker](crate::core).
pub mod http;
pub mod livesync;
pub mod signals;
pub mod udp;
