//! Statistical fitness scoring for candidate hash functions.
//!
//! A candidate's fitness is a scalar where **lower is better**, composed of
//! three parts:
//!
//! 1. **Avalanche** — for every (input bit, output bit) pair, the measured
//!    probability that flipping the input bit flips the output bit. The
//!    ideal is 0.5 everywhere; deviation is penalized super-linearly (an
//!    `exp` ramp), so a single badly biased cell dominates many mildly
//!    biased ones.
//! 2. **Independence** — a Wald–Wolfowitz runs test over the binarized
//!    cell matrix. Clustered over- and under-biased regions produce long
//!    runs and a large z-score even when the mean bias looks fine.
//! 3. **Timing** — the wall-clock cost of the measurement itself, weighted
//!    and added by the caller. This couples search pressure toward cheaper
//!    operation sequences.
//!
//! Scoring is non-deterministic (it samples random buffers) and the score
//! of a fixed sequence jitters between calls; the acceptance rule in
//! [`crate::HashForge`] is designed around that.
//!
//! The optional [`bias`] module carries the exhaustive/estimated 32-bit
//! bias scorer used for offline validation of small mixers; it is not
//! wired into the search controller.

mod avalanche;

#[cfg(feature = "bias")]
#[cfg_attr(docsrs, doc(cfg(feature = "bias")))]
pub mod bias;

pub use avalanche::{
    avalanche_component, evaluate, independence_component, Avalanche, FlipMatrix,
    DEFAULT_INDEPENDENCE,
};
