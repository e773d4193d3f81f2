//! Search tunables: the process-wide knobs an external console adjusts
//! while the search runs.
//!
//! One [`Tunables`] handle (usually inside an `Arc`) is shared by every
//! mutator role and by whatever drives the search. All cells are atomic, so
//! a console thread can retune mid-run without tearing; the scorer takes a
//! [`ScoreWeights`] snapshot at the start of each evaluation, so a weight
//! change applies from the next evaluation onward. Exact propagation timing
//! is deliberately unspecified (Relaxed ordering) — reproducing the instant
//! a console write lands is not a property the search guarantees.
//!
//! # Defaults
//!
//! | name | effect | default |
//! |------|--------|---------|
//! | `aval_rate` | weight on the avalanche component | 0.1 |
//! | `indep_rate` | weight on the independence component | 2.0 |
//! | `time_rate` | weight on scoring wall-clock time | 1.0 |
//! | `aval_byte` | sample buffer length in bytes | 47 |
//! | `aval_times` | samples per input bit | 5000 |
//! | `min_seq` / `max_seq` | sequence length bounds | 2 / 6 |

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::{HashForgeError, Result};

/// Weight snapshot consumed by one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Weight on the avalanche component.
    pub aval_rate: f64,
    /// Weight on the independence component.
    pub indep_rate: f64,
    /// Weight on the timing component.
    pub time_rate: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            aval_rate: 0.1,
            indep_rate: 2.0,
            time_rate: 1.0,
        }
    }
}

/// Shared, interior-mutable search configuration.
///
/// Floating-point cells are stored as `f64` bit patterns in `AtomicU64`;
/// all access is Relaxed.
#[derive(Debug)]
pub struct Tunables {
    aval_rate: AtomicU64,
    indep_rate: AtomicU64,
    time_rate: AtomicU64,
    aval_byte: AtomicUsize,
    aval_times: AtomicUsize,
    min_seq: AtomicUsize,
    max_seq: AtomicUsize,
}

impl Default for Tunables {
    fn default() -> Self {
        Self::new()
    }
}

impl Tunables {
    /// Create a handle with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        let w = ScoreWeights::default();
        Self {
            aval_rate: AtomicU64::new(w.aval_rate.to_bits()),
            indep_rate: AtomicU64::new(w.indep_rate.to_bits()),
            time_rate: AtomicU64::new(w.time_rate.to_bits()),
            aval_byte: AtomicUsize::new(47),
            aval_times: AtomicUsize::new(5000),
            min_seq: AtomicUsize::new(2),
            max_seq: AtomicUsize::new(6),
        }
    }

    /// Snapshot the three score weights for one evaluation.
    #[must_use]
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            aval_rate: f64::from_bits(self.aval_rate.load(Ordering::Relaxed)),
            indep_rate: f64::from_bits(self.indep_rate.load(Ordering::Relaxed)),
            time_rate: f64::from_bits(self.time_rate.load(Ordering::Relaxed)),
        }
    }

    /// Weight on the avalanche component.
    #[must_use]
    pub fn aval_rate(&self) -> f64 {
        f64::from_bits(self.aval_rate.load(Ordering::Relaxed))
    }

    /// Set the avalanche weight.
    pub fn set_aval_rate(&self, rate: f64) {
        self.aval_rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    /// Weight on the independence component.
    #[must_use]
    pub fn indep_rate(&self) -> f64 {
        f64::from_bits(self.indep_rate.load(Ordering::Relaxed))
    }

    /// Set the independence weight.
    pub fn set_indep_rate(&self, rate: f64) {
        self.indep_rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    /// Weight on the timing component.
    #[must_use]
    pub fn time_rate(&self) -> f64 {
        f64::from_bits(self.time_rate.load(Ordering::Relaxed))
    }

    /// Set the timing weight.
    pub fn set_time_rate(&self, rate: f64) {
        self.time_rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    /// Sample buffer length in bytes.
    #[must_use]
    pub fn aval_byte(&self) -> usize {
        self.aval_byte.load(Ordering::Relaxed)
    }

    /// Set the sample buffer length.
    ///
    /// # Errors
    ///
    /// Returns [`HashForgeError::InvalidSampleCount`] for a zero length.
    pub fn set_aval_byte(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(HashForgeError::invalid_sample_count(len));
        }
        self.aval_byte.store(len, Ordering::Relaxed);
        Ok(())
    }

    /// Samples per input bit.
    #[must_use]
    pub fn aval_times(&self) -> usize {
        self.aval_times.load(Ordering::Relaxed)
    }

    /// Set the per-bit sample count.
    ///
    /// # Errors
    ///
    /// Returns [`HashForgeError::InvalidSampleCount`] for a zero count.
    pub fn set_aval_times(&self, times: usize) -> Result<()> {
        if times == 0 {
            return Err(HashForgeError::invalid_sample_count(times));
        }
        self.aval_times.store(times, Ordering::Relaxed);
        Ok(())
    }

    /// Minimum sequence length.
    #[must_use]
    pub fn min_seq(&self) -> usize {
        self.min_seq.load(Ordering::Relaxed)
    }

    /// Maximum sequence length.
    #[must_use]
    pub fn max_seq(&self) -> usize {
        self.max_seq.load(Ordering::Relaxed)
    }

    /// Set both sequence-length bounds together.
    ///
    /// Setting them as a pair avoids a transient `min > max` window that
    /// two separate setters would expose to concurrently running roles.
    ///
    /// # Errors
    ///
    /// Returns [`HashForgeError::InvalidSequenceBounds`] unless
    /// `1 <= min <= max`.
    pub fn set_seq_bounds(&self, min: usize, max: usize) -> Result<()> {
        if min == 0 || min > max {
            return Err(HashForgeError::invalid_sequence_bounds(min, max));
        }
        self.min_seq.store(min, Ordering::Relaxed);
        self.max_seq.store(max, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table() {
        let t = Tunables::new();
        assert_eq!(t.aval_rate(), 0.1);
        assert_eq!(t.indep_rate(), 2.0);
        assert_eq!(t.time_rate(), 1.0);
        assert_eq!(t.aval_byte(), 47);
        assert_eq!(t.aval_times(), 5000);
        assert_eq!(t.min_seq(), 2);
        assert_eq!(t.max_seq(), 6);
    }

    #[test]
    fn test_weights_snapshot() {
        let t = Tunables::new();
        t.set_aval_rate(0.5);
        t.set_indep_rate(1.5);
        t.set_time_rate(0.0);
        let w = t.weights();
        assert_eq!(w.aval_rate, 0.5);
        assert_eq!(w.indep_rate, 1.5);
        assert_eq!(w.time_rate, 0.0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let t = Tunables::new();
        let w = t.weights();
        t.set_aval_rate(9.9);
        assert_eq!(w.aval_rate, 0.1, "snapshot must not track later writes");
    }

    #[test]
    fn test_seq_bounds_validation() {
        let t = Tunables::new();
        assert!(t.set_seq_bounds(0, 6).is_err());
        assert!(t.set_seq_bounds(4, 2).is_err());
        assert!(t.set_seq_bounds(3, 3).is_ok());
        assert_eq!(t.min_seq(), 3);
        assert_eq!(t.max_seq(), 3);
    }

    #[test]
    fn test_sample_validation() {
        let t = Tunables::new();
        assert!(t.set_aval_byte(0).is_err());
        assert!(t.set_aval_times(0).is_err());
        assert!(t.set_aval_byte(8).is_ok());
        assert!(t.set_aval_times(16).is_ok());
        assert_eq!(t.aval_byte(), 8);
        assert_eq!(t.aval_times(), 16);
    }

    #[test]
    fn test_concurrent_retune() {
        use std::sync::Arc;
        use std::thread;

        let t = Arc::new(Tunables::new());
        let writer = {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for i in 0..1000 {
                    t.set_time_rate(i as f64);
                }
            })
        };
        for _ in 0..1000 {
            let w = t.weights();
            assert!(w.time_rate >= 0.0 && w.time_rate < 1000.0);
        }
        writer.join().unwrap();
    }
}
