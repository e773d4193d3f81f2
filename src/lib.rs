//! HashForge: evolutionary search for 64-bit hash mixing functions.
//!
//! HashForge hunts for high-quality, non-cryptographic mixing finalizers by
//! stochastically mutating a sequence of 64-bit operations and keeping only
//! the mutations that improve a measured statistical fitness score.
//!
//! # How the search works
//!
//! A candidate hash is an absorbing construction ([`hash::hash_value`])
//! finished by a program of mixing primitives (an [`sequence::OpSequence`]
//! of [`ops::Op`]): multiplies by curated odd constants, xorshifts,
//! rotations, adds, byte swaps and friends. Four mutator roles — Add,
//! Delete, Modify, Swap — plus a per-operation argument mutator propose
//! random edits; every proposal is scored by the avalanche/independence
//! scorer ([`fitness::Avalanche`]) and kept only if it beats the best score
//! seen so far, otherwise it is rolled back exactly. All of this runs on
//! OS threads contending for one lock, forever, until stopped.
//!
//! Lower scores are better. The score mixes three pressures: per-bit
//! avalanche quality (every input-bit flip should flip every output bit
//! with probability 0.5), a runs-test over the bias matrix (biases must
//! not cluster), and the wall-clock cost of scoring itself (cheaper
//! sequences win ties).
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hashforge::{HashForge, Tunables};
//!
//! let tunables = Arc::new(Tunables::new());
//! let forge = Arc::new(HashForge::new(Arc::clone(&tunables)));
//!
//! forge.start();
//! std::thread::sleep(std::time::Duration::from_secs(300));
//! forge.stop();
//!
//! println!("{}", forge.report().unwrap_or_else(|| "nothing found".into()));
//! ```
//!
//! # Hashing through the live sequence
//!
//! ```
//! use std::sync::Arc;
//! use hashforge::{HashForge, Tunables};
//! use hashforge::ops::{Op, OpKind};
//!
//! let forge = HashForge::with_baseline(
//!     Arc::new(Tunables::new()),
//!     vec![
//!         Op::from_parts(OpKind::RotateRight, 48).unwrap(),
//!         Op::from_parts(OpKind::Mul, 0x2127599bf4325c37).unwrap(),
//!         Op::from_parts(OpKind::XorShiftRight, 34).unwrap(),
//!     ],
//! ).unwrap();
//!
//! let digest = forge.gen_hash(b"hello world");
//! assert_eq!(digest, forge.gen_hash(b"hello world"));
//! ```
//!
//! # Features
//!
//! - `serde` — serialize [`ops::Op`] / [`engine::BestSeen`] so drivers can
//!   persist winning sequences
//! - `xxhash` — `reference` baselines backed by xxh3
//! - `bias` — the exhaustive/estimated 32-bit bias scorer
//!   (`fitness::bias`), parallelized with rayon
//!
//! # Non-goals
//!
//! The evolved hashes are explicitly non-cryptographic (the primitives are
//! mostly reversible). The search is hill-climbing, not exhaustive: it
//! finds good sequences, not provably optimal ones. Runs are seeded from
//! the wall clock and are not reproducible across invocations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/hashforge/0.1.0")]

/// Shared search tunables and score-weight snapshots
pub mod config;

/// The mutation/acceptance controller
pub mod engine;

/// Error types and result alias
pub mod error;

/// Statistical fitness scoring
pub mod fitness;

/// The absorbing hash construction
pub mod hash;

/// The operation vocabulary and adjacency rule
pub mod ops;

/// Worker-thread PRNG and integer finalizers
pub mod rng;

/// The operation sequence and its mutation primitives
pub mod sequence;

/// Baseline hashes for score comparison (requires `xxhash` feature)
#[cfg(feature = "xxhash")]
#[cfg_attr(docsrs, doc(cfg(feature = "xxhash")))]
pub mod reference;

pub use config::{ScoreWeights, Tunables};
pub use engine::{BestSeen, EngineStats, HashForge};
pub use error::{HashForgeError, Result};
pub use fitness::Avalanche;
pub use hash::hash_value;
pub use ops::{Op, OpKind, MUL_CONSTANTS};
pub use sequence::OpSequence;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use hashforge::prelude::*;
///
/// let seq = OpSequence::try_from_ops(vec![
///     Op::from_parts(OpKind::RotateRight, 33).unwrap(),
/// ]).unwrap();
/// let _ = hash_value(b"data", &seq);
/// ```
pub mod prelude {
    pub use crate::config::{ScoreWeights, Tunables};
    pub use crate::engine::{BestSeen, HashForge};
    pub use crate::error::{HashForgeError, Result};
    pub use crate::fitness::Avalanche;
    pub use crate::hash::hash_value;
    pub use crate::ops::{Op, OpKind};
    pub use crate::sequence::OpSequence;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let seq = OpSequence::try_from_ops(vec![
            Op::from_parts(OpKind::RotateRight, 48).unwrap(),
            Op::from_parts(OpKind::XorShiftRight, 34).unwrap(),
        ])
        .unwrap();
        assert_eq!(hash_value(b"test", &seq), hash_value(b"test", &seq));
    }

    #[test]
    fn test_engine_construction_via_prelude() {
        let forge = HashForge::new(Arc::new(Tunables::new()));
        assert!(forge.best_seen().is_none());
        assert!(!forge.is_running());
    }
}
