//! HTTP tracker domain services.
//!
//! They glue the HTTP delivery layer to the core tracker: resolve the
//! client IP, run the request against the tracker and send the
//! statistics events.
pub mod announce;
pub mod peer_ip_resolver;
pub mod scrape;
