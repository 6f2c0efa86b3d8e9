//! Setup for the application.
//!
//! The bootstrap process has the following steps:
//!
//! 1. Parse the CLI arguments.
//! 2. Load the configuration (env var, file or defaults) and apply the
//!    CLI overrides.
//! 3. Initialize logging and the application statics.
//! 4. Build the domain tracker and its channels.
//!
//! Starting the jobs (servers, timers, signal watchers) is the
//! [`app`](crate::app) module's business.
pub mod app;
pub mod cli;
pub mod config;
pub mod jobs;
pub mod logging;
