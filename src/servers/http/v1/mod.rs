//! HTTP tracker, version `v1`: routing, request parsing and bencoded
//! responses.
pub mod extractors;
pub mod handlers;
pub mod launcher;
pub mod query;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
