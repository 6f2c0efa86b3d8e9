//! Helpers for testing the tracker: ephemeral configurations and random
//! value generators.
pub mod configuration;
pub mod random;
