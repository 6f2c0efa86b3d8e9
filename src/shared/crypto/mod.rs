//! The per-process secret seed.
//!
//! A single 32-byte seed is drawn from the OS entropy pool when the
//! process starts. It is never persisted and never leaves the process;
//! everything derived from it (UDP connection ids, the live-sync instance
//! id) dies with the process that minted it.
//!
//! Under `cfg(test)` the seed is all zeroes, so derived values are
//! reproducible across test runs.
use rand::Rng;

/// The secret seed type: 32 random bytes.
pub type Seed = [u8; 32];

#[cfg(test)]
const ZEROED_TEST_SEED: Seed = [0u8; 32];

lazy_static! {
    static ref INSTANCE_SEED: Seed = rand::thread_rng().gen();
}

/// The seed for this execution.
#[cfg(not(test))]
#[must_use]
pub fn current_seed() -> &'static Seed {
    &INSTANCE_SEED
}

/// The seed for this execution: zeroed, because we are testing.
#[cfg(test)]
#[must_use]
pub fn current_seed() -> &'static Seed {
    &ZEROED_TEST_SEED
}

/// Forces the lazy seed to be drawn now, so the first request does not
/// pay for it.
pub fn initialize_instance_seed() {
    lazy_static::initialize(&INSTANCE_SEED);
}
