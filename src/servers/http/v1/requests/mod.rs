//! HTTP requests parsing for the HTTP tracker.
pub mod announce;
pub mod scrape;
