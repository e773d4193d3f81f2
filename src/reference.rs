//! Baseline hash functions for score comparison.
//!
//! A search result only means something next to a known-good reference.
//! These adapters expose published hashes in the scorer's
//! `fn(&[u8]) -> u64` shape so a driver can print their scores beside the
//! evolved sequence's.
//!
//! # Examples
//!
//! ```
//! use hashforge::config::ScoreWeights;
//! use hashforge::fitness::Avalanche;
//! use hashforge::reference;
//!
//! let weights = ScoreWeights::default();
//! let (score, elapsed) = Avalanche::with_seed(1).score(reference::xxh3, 8, 16, &weights);
//! println!("xxh3: aval_score={score} time={elapsed:?}");
//! ```

use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// xxh3, unseeded.
#[must_use]
pub fn xxh3(buf: &[u8]) -> u64 {
    xxh3_64(buf)
}

/// xxh3 with an explicit seed, for checking seed independence of scores.
#[must_use]
pub fn xxh3_seeded(seed: u64) -> impl Fn(&[u8]) -> u64 {
    move |buf| xxh3_64_with_seed(buf, seed)
}
