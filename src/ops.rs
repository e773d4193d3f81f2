//! The operation model: the vocabulary of 64-bit mixing primitives the
//! search composes into candidate finalizers.
//!
//! An [`Op`] is one transform of the running state word. Most kinds are
//! reversible (multiply by an odd constant, xorshift, rotate-xor, add,
//! xor, not, byte-swap); [`OpKind::ShiftLeft`] is deliberately lossy and
//! kept only for search diversity.
//!
//! # Arguments
//!
//! Argument semantics depend on the kind:
//! - shift-family kinds reduce the raw draw to the `1..=63` range;
//! - [`OpKind::Mul`] draws from [`MUL_CONSTANTS`], a curated table of odd
//!   constants known to mix well in published hash functions;
//! - add/xor/sub/xor-square keep the raw 64-bit draw;
//! - not/byte-swap ignore the argument entirely.
//!
//! # Adjacency
//!
//! Two equal non-shift kinds back-to-back collapse into a single
//! equivalent operation (two multiplies are one multiply, two nots cancel),
//! so the search space excludes them: [`OpKind::may_follow`] is the rule
//! table. Shift-family kinds compose without collapsing and may always be
//! adjacent, including to themselves.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of operation kinds in the vocabulary.
pub const OP_KIND_COUNT: usize = 13;

/// Curated odd 64-bit multiply constants.
///
/// Every entry is a mixing constant proven in a published hash function:
/// the murmur3 finalizer pair, the splitmix64 pair, the golden-ratio
/// increment, the odd xxh64 primes, the fast-mix constant, and the two
/// absorbing-lane constants from [`crate::hash`]. The multiply operation
/// draws only from this table.
pub const MUL_CONSTANTS: [u64; 12] = [
    0xff51_afd7_ed55_8ccd,
    0xc4ce_b9fe_1a85_ec53,
    0xbf58_476d_1ce4_e5b9,
    0x94d0_49bb_1331_11eb,
    0x9e37_79b9_7f4a_7c15,
    0x9e37_79b1_85eb_ca87,
    0xc2b2_ae3d_27d4_eb4f,
    0x1656_67b1_9e37_79f9,
    0x27d4_eb2f_1656_67c5,
    0x2127_599b_f432_5c37,
    0xd364_6318_7cc7_0d7b,
    0xb597_d0ce_ca3f_6e07,
];

/// One kind of 64-bit mixing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    /// `x *= c` with `c` forced odd.
    Mul,
    /// `x ^= x << k`.
    XorShiftLeft,
    /// `x ^= x >> k`.
    XorShiftRight,
    /// `x ^= rotr(x, k)`.
    RotateRight,
    /// `x += c`.
    Add,
    /// `x ^= c`.
    Xor,
    /// `x = !x`.
    Not,
    /// `x = bswap64(x)`.
    ByteSwap,
    /// `x += x << k`.
    AddShiftLeft,
    /// `x -= x << k`.
    SubShiftLeft,
    /// `x -= c`.
    Sub,
    /// `x <<= k`. Lossy; kept as a deliberately worse option.
    ShiftLeft,
    /// `x = (c | 1) ^ (c * c)` where `c` is the operation's own argument.
    XorSquare,
}

impl OpKind {
    /// Every kind, in a fixed order used for random draws.
    pub const ALL: [OpKind; OP_KIND_COUNT] = [
        OpKind::Mul,
        OpKind::XorShiftLeft,
        OpKind::XorShiftRight,
        OpKind::RotateRight,
        OpKind::Add,
        OpKind::Xor,
        OpKind::Not,
        OpKind::ByteSwap,
        OpKind::AddShiftLeft,
        OpKind::SubShiftLeft,
        OpKind::Sub,
        OpKind::ShiftLeft,
        OpKind::XorSquare,
    ];

    /// Map a raw random draw onto a kind.
    #[inline]
    #[must_use]
    pub fn from_draw(rnd: u64) -> Self {
        Self::ALL[(rnd % OP_KIND_COUNT as u64) as usize]
    }

    /// Whether this kind takes a shift/rotate amount in `1..=63`.
    #[must_use]
    pub fn is_shift_family(self) -> bool {
        matches!(
            self,
            OpKind::XorShiftLeft
                | OpKind::XorShiftRight
                | OpKind::RotateRight
                | OpKind::AddShiftLeft
                | OpKind::SubShiftLeft
                | OpKind::ShiftLeft
        )
    }

    /// Whether this kind reads its argument at all.
    #[must_use]
    pub fn uses_argument(self) -> bool {
        !matches!(self, OpKind::Not | OpKind::ByteSwap)
    }

    /// The adjacency rule: may `self` be placed immediately after `prev`?
    ///
    /// Shift-family kinds may always be adjacent; any other kind must not
    /// repeat back-to-back.
    #[must_use]
    pub fn may_follow(self, prev: OpKind) -> bool {
        self != prev || self.is_shift_family()
    }

    /// Short mnemonic used in reports.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpKind::Mul => "MUL",
            OpKind::XorShiftLeft => "XSL",
            OpKind::XorShiftRight => "XSR",
            OpKind::RotateRight => "ROR",
            OpKind::Add => "ADD",
            OpKind::Xor => "XOR",
            OpKind::Not => "NOT",
            OpKind::ByteSwap => "BSW",
            OpKind::AddShiftLeft => "ASL",
            OpKind::SubShiftLeft => "SSL",
            OpKind::Sub => "SUB",
            OpKind::ShiftLeft => "SHL",
            OpKind::XorSquare => "XSQ",
        }
    }
}

/// Slot identity counter. Ids are engine-internal handles tying a live
/// operation to its argument-mutator worker; they carry no semantics.
static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_slot_id() -> u64 {
    NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed)
}

/// One mixing operation: a kind plus its normalized argument.
///
/// Equality compares kind and argument only; the slot id is an internal
/// handle and two ops with equal kind/argument are equal regardless of it.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Op {
    kind: OpKind,
    arg: u64,
    #[cfg_attr(feature = "serde", serde(skip, default = "fresh_slot_id"))]
    id: u64,
}

impl PartialEq for Op {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.arg == other.arg
    }
}

impl Eq for Op {}

impl Op {
    /// Create an operation from a kind and a raw random draw; the draw is
    /// normalized per the kind's argument semantics.
    #[must_use]
    pub fn new(kind: OpKind, raw: u64) -> Self {
        Self {
            kind,
            arg: normalize_arg(kind, raw),
            id: fresh_slot_id(),
        }
    }

    /// Create an operation from explicit parts, validating the argument.
    ///
    /// Shift-family amounts must already be in `1..=63`; other kinds accept
    /// any argument. Use this for hand-built baseline sequences.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HashForgeError::InvalidShiftAmount`] for an
    /// out-of-range shift amount.
    pub fn from_parts(kind: OpKind, arg: u64) -> crate::Result<Self> {
        if kind.is_shift_family() && !(1..=63).contains(&arg) {
            return Err(crate::HashForgeError::invalid_shift_amount(arg));
        }
        Ok(Self {
            kind,
            arg,
            id: fresh_slot_id(),
        })
    }

    /// The operation's kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// The operation's normalized argument.
    #[inline]
    #[must_use]
    pub fn arg(&self) -> u64 {
        self.arg
    }

    /// Engine-internal slot id.
    #[inline]
    pub(crate) fn slot_id(&self) -> u64 {
        self.id
    }

    /// Replace the argument from a fresh raw draw, keeping the kind.
    pub fn redraw_arg(&mut self, raw: u64) {
        self.arg = normalize_arg(self.kind, raw);
    }

    /// Replace kind and argument in place, keeping the slot id.
    ///
    /// Modify and Swap mutate slots rather than replacing them, so the
    /// argument-mutator attached to the slot keeps running.
    pub(crate) fn set_parts(&mut self, kind: OpKind, arg: u64) {
        self.kind = kind;
        self.arg = arg;
    }

    /// Apply the operation to the running state word.
    #[inline]
    #[must_use]
    pub fn apply(&self, x: u64) -> u64 {
        let k = self.arg as u32;
        match self.kind {
            OpKind::Mul => x.wrapping_mul(self.arg | 1),
            OpKind::XorShiftLeft => x ^ (x << k),
            OpKind::XorShiftRight => x ^ (x >> k),
            OpKind::RotateRight => x ^ x.rotate_right(k),
            OpKind::Add => x.wrapping_add(self.arg),
            OpKind::Xor => x ^ self.arg,
            OpKind::Not => !x,
            OpKind::ByteSwap => x.swap_bytes(),
            OpKind::AddShiftLeft => x.wrapping_add(x << k),
            OpKind::SubShiftLeft => x.wrapping_sub(x << k),
            OpKind::Sub => x.wrapping_sub(self.arg),
            OpKind::ShiftLeft => x << k,
            OpKind::XorSquare => (self.arg | 1) ^ self.arg.wrapping_mul(self.arg),
        }
    }
}

/// Normalize a raw 64-bit draw into a valid argument for `kind`.
#[must_use]
pub fn normalize_arg(kind: OpKind, raw: u64) -> u64 {
    match kind {
        OpKind::Mul => MUL_CONSTANTS[(raw % MUL_CONSTANTS.len() as u64) as usize],
        k if k.is_shift_family() => raw % 63 + 1,
        _ => raw,
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Not | OpKind::ByteSwap => write!(f, "{}", self.kind.mnemonic()),
            k if k.is_shift_family() => write!(f, "{}({})", self.kind.mnemonic(), self.arg),
            _ => write!(f, "{}({:016x})", self.kind.mnemonic(), self.arg),
        }
    }
}
