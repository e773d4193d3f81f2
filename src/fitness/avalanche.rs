//! Avalanche and bit-independence measurement.
//!
//! [`Avalanche::measure`] builds the flip-probability matrix: for each
//! input bit, it hashes `times` random buffers with and without that bit
//! flipped and histograms which output bits changed. [`Avalanche::score`]
//! condenses the matrix into the weighted scalar the search minimizes.

use std::time::Instant;

use crate::config::ScoreWeights;
use crate::rng::Nr3Rng;

/// Sentinel score for degenerate independence streams (fewer than two
/// symbols, or zero variance under the run-count null model).
pub const DEFAULT_INDEPENDENCE: f64 = 10.0;

/// `exp(8)`, the contribution of a perfectly unbiased cell before the
/// offset is removed. Kept at full precision so an ideal cell scores ~0.
const AVALANCHE_OFFSET: f64 = 2980.957_987_041_728_274_743_59;

/// Flip-probability matrix: one row per input bit, 64 columns of output
/// bits, each cell the fraction of samples where the output bit flipped.
#[derive(Debug, Clone)]
pub struct FlipMatrix {
    nbit: usize,
    cells: Vec<f64>,
}

impl FlipMatrix {
    fn zeroed(nbit: usize) -> Self {
        Self {
            nbit,
            cells: vec![0.0; nbit * 64],
        }
    }

    /// Number of input-bit rows.
    #[must_use]
    pub fn nbit(&self) -> usize {
        self.nbit
    }

    /// Flip probability for one (input bit, output bit) cell.
    #[must_use]
    pub fn get(&self, input_bit: usize, output_bit: usize) -> f64 {
        self.cells[input_bit * 64 + output_bit]
    }

    fn row_mut(&mut self, input_bit: usize) -> &mut [f64] {
        &mut self.cells[input_bit * 64..(input_bit + 1) * 64]
    }

    #[cfg(test)]
    fn filled(nbit: usize, value: f64) -> Self {
        Self {
            nbit,
            cells: vec![value; nbit * 64],
        }
    }

    #[cfg(test)]
    fn set(&mut self, input_bit: usize, output_bit: usize, value: f64) {
        self.cells[input_bit * 64 + output_bit] = value;
    }
}

/// Credit every set bit of a digest diff to its output-bit counter.
fn accumulate(row: &mut [f64], mut diff: u64) {
    while diff != 0 {
        row[diff.trailing_zeros() as usize] += 1.0;
        diff &= diff - 1;
    }
}

/// The avalanche scorer. Owns its sampling PRNG; one instance per caller.
#[derive(Debug)]
pub struct Avalanche {
    rng: Nr3Rng,
}

impl Default for Avalanche {
    fn default() -> Self {
        Self::new()
    }
}

impl Avalanche {
    /// Create a scorer seeded from the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Nr3Rng::from_entropy(),
        }
    }

    /// Create a scorer with a fixed seed, for reproducible measurements.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Nr3Rng::new(seed),
        }
    }

    /// Measure the flip-probability matrix of `f` over `len`-byte buffers,
    /// `times` samples per input bit.
    pub fn measure<F>(&mut self, f: F, len: usize, times: usize) -> FlipMatrix
    where
        F: Fn(&[u8]) -> u64,
    {
        let nbit = len * 8;
        let mut mat = FlipMatrix::zeroed(nbit);
        let mut buf = vec![0u8; len];

        for i in 0..nbit {
            for _ in 0..times {
                self.rng.fill_bytes(&mut buf);
                let h0 = f(&buf);
                buf[i >> 3] ^= 1 << (i & 7);
                let h1 = f(&buf);
                accumulate(mat.row_mut(i), h0 ^ h1);
            }
            let norm = times as f64;
            for cell in mat.row_mut(i) {
                *cell /= norm;
            }
        }
        mat
    }

    /// Measure and evaluate in one step, returning the weighted score and
    /// the elapsed measurement time.
    ///
    /// The timing component is *not* folded in here; the caller owns the
    /// `elapsed * time_rate` term so it can also cover rollback bookkeeping
    /// it performs around the measurement.
    pub fn score<F>(
        &mut self,
        f: F,
        len: usize,
        times: usize,
        weights: &ScoreWeights,
    ) -> (f64, std::time::Duration)
    where
        F: Fn(&[u8]) -> u64,
    {
        let started = Instant::now();
        let mat = self.measure(f, len, times);
        let score = evaluate(&mat, weights);
        (score, started.elapsed())
    }
}

/// Condense a flip matrix into the weighted avalanche + independence score.
#[must_use]
pub fn evaluate(mat: &FlipMatrix, weights: &ScoreWeights) -> f64 {
    avalanche_component(mat) * weights.aval_rate
        + independence_component(mat) * weights.indep_rate
}

/// Mean super-linear deviation penalty over all cells.
#[must_use]
pub fn avalanche_component(mat: &FlipMatrix) -> f64 {
    let mut r = 0.0;
    for &cell in &mat.cells {
        let m = (cell - 0.5).abs();
        r += (m + 8.0).exp() - AVALANCHE_OFFSET;
    }
    r / (mat.nbit as f64 * 64.0)
}

/// Runs-test z-score of the binarized cell stream.
#[must_use]
pub fn independence_component(mat: &FlipMatrix) -> f64 {
    let bits: Vec<u8> = mat.cells.iter().map(|&c| u8::from(c > 0.5)).collect();
    runs_z_score(&bits)
}

/// Wald–Wolfowitz runs statistic against the binomial-run null model,
/// continuity-corrected, with a virtual trailing zero closing the final
/// run of ones.
fn runs_z_score(s: &[u8]) -> f64 {
    let num = s.len();
    if num < 2 {
        return DEFAULT_INDEPENDENCE;
    }

    let mut one_runs = 0.0f64;
    let mut n = 0.0f64;
    let mut m = 0.0f64;
    for i in 0..num {
        let cur = f64::from(s[i]);
        let next = if i + 1 < num { f64::from(s[i + 1]) } else { 0.0 };
        one_runs += cur * (1.0 - next);
        n += cur;
        m += 1.0 - cur;
    }
    let mut r = 2.0 * one_runs - 1.0;
    if s[0] == 0 {
        r += 1.0;
    }
    if s[num - 1] == 0 {
        r += 1.0;
    }

    let total = n + m;
    let mean = 2.0 * n * m / total + 1.0;
    let var = 2.0 * n * m / total * (2.0 * n * m - n - m) / total / (total - 1.0);
    if var <= 0.0 {
        return DEFAULT_INDEPENDENCE;
    }
    if r > mean {
        (r - mean - 0.5).abs() / var.sqrt()
    } else {
        (r - mean + 0.5).abs() / var.sqrt()
    }
}
