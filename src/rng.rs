//! Seeded pseudo-random generation for the search workers.
//!
//! Every worker thread owns its own [`Nr3Rng`] instance; state is never
//! shared. The generator combines three independent 64-bit lanes (a linear
//! congruential lane, a xorshift lane, and a multiply-with-carry lane) and
//! has a period around 3.1×10^57, far beyond anything the search can
//! exhaust. It is **not** cryptographic, which is fine: it only drives
//! sampling and mutation-site selection.
//!
//! Seeding for live searches comes from the wall clock mixed through
//! [`fmix64`], so runs are deliberately non-deterministic. Tests pass a
//! fixed seed instead.
//!
//! # Examples
//!
//! ```
//! use hashforge::rng::Nr3Rng;
//!
//! let mut a = Nr3Rng::new(42);
//! let mut b = Nr3Rng::new(42);
//! assert_eq!(a.next_u64(), b.next_u64());
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Combined-lane generator with `(u64, u64, u64)` state.
///
/// One instance per owning thread; independent instances share nothing.
#[derive(Debug, Clone)]
pub struct Nr3Rng {
    u: u64,
    v: u64,
    w: u64,
}

impl Nr3Rng {
    /// Create a generator from an explicit seed.
    ///
    /// The warm-up advances each lane once so that nearby seeds do not
    /// produce correlated early output.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            u: 0,
            v: 4101842887655102017,
            w: 1,
        };
        rng.u = seed ^ rng.v;
        rng.next_u64();
        rng.v = rng.u;
        rng.next_u64();
        rng.w = rng.v;
        rng.next_u64();
        rng
    }

    /// Create a generator seeded from the wall clock.
    ///
    /// The nanosecond timestamp is mixed through [`fmix64`] so that workers
    /// created within the same tick still diverge. Non-deterministic across
    /// runs by design.
    #[must_use]
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        // Stack address varies per thread and breaks ties between workers
        // spawned in the same nanosecond tick.
        let marker = 0u8;
        let salt = &marker as *const u8 as usize as u64;
        Self::new(fmix64(nanos ^ salt.rotate_left(32)))
    }

    /// Produce the next uniform 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.u = self
            .u
            .wrapping_mul(2862933555777941757)
            .wrapping_add(7046029254386353087);
        self.v ^= self.v >> 17;
        self.v ^= self.v << 31;
        self.v ^= self.v >> 8;
        self.w = 4294957665u64
            .wrapping_mul(self.w & 0xffff_ffff)
            .wrapping_add(self.w >> 32);
        let mut x = self.u ^ (self.u << 21);
        x ^= x >> 35;
        x ^= x << 4;
        x.wrapping_add(self.v) ^ self.w
    }

    /// Fill a buffer with uniform random bytes.
    ///
    /// Each 8-byte chunk is one generator output passed through
    /// [`mix64_fast`]; a partial tail takes the leading bytes of one more
    /// mixed word.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        let mut chunks = buf.chunks_exact_mut(8);
        for chunk in &mut chunks {
            let n = mix64_fast(self.next_u64());
            chunk.copy_from_slice(&n.to_le_bytes());
        }
        let tail = chunks.into_remainder();
        if !tail.is_empty() {
            let n = mix64_fast(self.next_u64());
            tail.copy_from_slice(&n.to_le_bytes()[..tail.len()]);
        }
    }
}

/// Murmur-style 64-bit finalizer.
///
/// Full-strength integer mix: three xorshifts interleaved with two odd
/// multiplies. Used to condition entropy seeds.
#[inline]
#[must_use]
pub const fn fmix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Cheap 3-operation 64-bit finalizer.
///
/// Weaker than [`fmix64`] but half the cost; good enough for whitening
/// generator words before they become sample-buffer bytes.
#[inline]
#[must_use]
pub const fn mix64_fast(mut x: u64) -> u64 {
    x ^= x >> 23;
    x = x.wrapping_mul(0x2127_599b_f432_5c37);
    x ^= x >> 47;
    x
}
