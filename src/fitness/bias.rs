//! 32-bit bias scoring for small mixers.
//!
//! This is the offline validation scorer: it measures, for every
//! (input bit, output bit) pair of a 32-bit mixer, how far the flip count
//! strays from the expected 50%, and aggregates the deviations as an RMS
//! permille figure. Zero is a perfect mixer; published good 32-bit mixers
//! land well under 1.0.
//!
//! Two variants:
//! - [`estimate_bias32`] samples 2^18 random inputs — seconds of CPU,
//!   accurate to roughly ±0.2;
//! - [`exact_bias32`] sweeps the entire 32-bit input space in parallel —
//!   minutes of CPU, exact.
//!
//! Neither is wired into the search controller; the avalanche scorer in
//! [`crate::fitness`] drives the search. The usual workflow is to evolve a
//! sequence, specialize it to 32 bits by hand, and confirm it here.

use rayon::prelude::*;

use crate::rng::Nr3Rng;

/// Sample exponent for the estimated scorer: 2^18 inputs.
const ESTIMATE_QUALITY: u32 = 18;

/// Number of parallel chunks for the exhaustive sweep.
const EXACT_SPLIT: u64 = 32;

fn rms_permille(bins: &[[u64; 32]; 32], half: f64) -> f64 {
    let mut mean = 0.0;
    for row in bins {
        for &count in row {
            let diff = (count as f64 - half) / half;
            mean += diff * diff / (32.0 * 32.0);
        }
    }
    mean.sqrt() * 1000.0
}

/// Estimate the bias of a 32-bit mixer from 2^18 random samples.
pub fn estimate_bias32<F>(f: F, rng: &mut Nr3Rng) -> f64
where
    F: Fn(u32) -> u32,
{
    let n = 1u64 << ESTIMATE_QUALITY;
    let mut bins = [[0u64; 32]; 32];

    for _ in 0..n {
        let x = rng.next_u64() as u32;
        let h0 = f(x);
        for (j, row) in bins.iter_mut().enumerate() {
            let h1 = f(x ^ (1 << j));
            let set = h0 ^ h1;
            for (k, cell) in row.iter_mut().enumerate() {
                *cell += u64::from((set >> k) & 1);
            }
        }
    }
    rms_permille(&bins, n as f64 / 2.0)
}

/// Exhaustively measure the bias of a 32-bit mixer over the full input
/// space. The sweep is split into [`EXACT_SPLIT`] ranges processed in
/// parallel.
pub fn exact_bias32<F>(f: F) -> f64
where
    F: Fn(u32) -> u32 + Sync,
{
    let range = (1u64 << 32) / EXACT_SPLIT;
    let bins = (0..EXACT_SPLIT)
        .into_par_iter()
        .map(|chunk| {
            let mut local = [[0u64; 32]; 32];
            for x in chunk * range..(chunk + 1) * range {
                let x = x as u32;
                let h0 = f(x);
                for (j, row) in local.iter_mut().enumerate() {
                    let h1 = f(x ^ (1 << j));
                    let set = h0 ^ h1;
                    for (k, cell) in row.iter_mut().enumerate() {
                        *cell += u64::from((set >> k) & 1);
                    }
                }
            }
            local
        })
        .reduce(
            || [[0u64; 32]; 32],
            |mut acc, local| {
                for (arow, lrow) in acc.iter_mut().zip(local.iter()) {
                    for (a, l) in arow.iter_mut().zip(lrow.iter()) {
                        *a += l;
                    }
                }
                acc
            },
        );

    rms_permille(&bins, (1u64 << 31) as f64)
}
