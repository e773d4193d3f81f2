//! The operation sequence: the ordered program a candidate finalizer runs.
//!
//! Order is semantically significant; [`OpSequence::process`] literally
//! executes the list against a state word. The mutation primitives here are
//! shaped so the engine can roll a rejected proposal back exactly: `remove`
//! returns the removed op, `modify` returns the previous parts, `swap` is
//! its own inverse.
//!
//! Adjacency legality is checked by the callers *before* mutating (the
//! engine never proposes an illegal edit), but [`OpSequence::try_from_ops`]
//! re-validates wholesale for caller-supplied baselines.

use std::fmt;

use crate::ops::{Op, OpKind};
use crate::{HashForgeError, Result};

/// An ordered list of mixing operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpSequence {
    ops: Vec<Op>,
}

impl OpSequence {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Build a sequence from explicit operations, validating the adjacency
    /// rule.
    ///
    /// # Errors
    ///
    /// Returns [`HashForgeError::AdjacencyViolation`] naming the first
    /// offending pair.
    pub fn try_from_ops(ops: Vec<Op>) -> Result<Self> {
        for (i, pair) in ops.windows(2).enumerate() {
            if !pair[1].kind().may_follow(pair[0].kind()) {
                return Err(HashForgeError::adjacency_violation(i));
            }
        }
        Ok(Self { ops })
    }

    /// Number of operations.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the sequence is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The operations, in execution order.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Run the program against a state word.
    #[inline]
    #[must_use]
    pub fn process(&self, mut x: u64) -> u64 {
        for op in &self.ops {
            x = op.apply(x);
        }
        x
    }

    /// Snapshot the current (kind, argument) program for BestSeen.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Op> {
        self.ops.clone()
    }

    /// Whether every adjacent pair satisfies the adjacency rule.
    #[must_use]
    pub fn is_adjacency_legal(&self) -> bool {
        self.ops
            .windows(2)
            .all(|pair| pair[1].kind().may_follow(pair[0].kind()))
    }

    /// Would inserting `kind` at `pos` keep both neighbor pairs legal?
    #[must_use]
    pub fn insertion_is_legal(&self, pos: usize, kind: OpKind) -> bool {
        debug_assert!(pos <= self.ops.len());
        if pos > 0 && !kind.may_follow(self.ops[pos - 1].kind()) {
            return false;
        }
        if pos < self.ops.len() && !self.ops[pos].kind().may_follow(kind) {
            return false;
        }
        true
    }

    /// Would removing the op at `pos` keep the newly adjacent pair legal?
    #[must_use]
    pub fn removal_is_legal(&self, pos: usize) -> bool {
        debug_assert!(pos < self.ops.len());
        if pos == 0 || pos + 1 >= self.ops.len() {
            return true;
        }
        self.ops[pos + 1].kind().may_follow(self.ops[pos - 1].kind())
    }

    /// Would rewriting the op at `pos` to `kind` keep both pairs legal?
    #[must_use]
    pub fn rewrite_is_legal(&self, pos: usize, kind: OpKind) -> bool {
        debug_assert!(pos < self.ops.len());
        if pos > 0 && !kind.may_follow(self.ops[pos - 1].kind()) {
            return false;
        }
        if pos + 1 < self.ops.len() && !self.ops[pos + 1].kind().may_follow(kind) {
            return false;
        }
        true
    }

    /// Insert an op at `pos`.
    pub fn insert(&mut self, pos: usize, op: Op) {
        self.ops.insert(pos, op);
    }

    /// Remove and return the op at `pos`; reinserting it at the same
    /// position is an exact rollback.
    pub fn remove(&mut self, pos: usize) -> Op {
        self.ops.remove(pos)
    }

    /// Rewrite the slot at `pos` in place, returning the previous
    /// `(kind, arg)` for rollback. The slot id is preserved, so the slot's
    /// argument-mutator keeps running against the new contents.
    pub fn modify(&mut self, pos: usize, kind: OpKind, arg: u64) -> (OpKind, u64) {
        let slot = &mut self.ops[pos];
        let prev = (slot.kind(), slot.arg());
        slot.set_parts(kind, arg);
        prev
    }

    /// Exchange the `(kind, arg)` contents of two slots, ids stay put.
    /// Applying the same swap again is an exact rollback.
    pub fn swap_contents(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (ka, va) = (self.ops[a].kind(), self.ops[a].arg());
        let (kb, vb) = (self.ops[b].kind(), self.ops[b].arg());
        self.ops[a].set_parts(kb, vb);
        self.ops[b].set_parts(ka, va);
    }

    /// Find the index of the slot carrying `id`, if it is still live.
    pub(crate) fn position_of(&self, id: u64) -> Option<usize> {
        self.ops.iter().position(|op| op.slot_id() == id)
    }

    /// Mutable access to one slot, used by the argument mutator.
    pub(crate) fn op_mut(&mut self, pos: usize) -> &mut Op {
        &mut self.ops[pos]
    }
}

impl fmt::Display for OpSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in &self.ops {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{op}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::MUL_CONSTANTS;

    fn seq(parts: &[(OpKind, u64)]) -> OpSequence {
        OpSequence::try_from_ops(
            parts
                .iter()
                .map(|&(k, a)| Op::from_parts(k, a).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_process_is_identity() {
        let s = OpSequence::new();
        assert_eq!(s.process(0xdead_beef), 0xdead_beef);
    }

    #[test]
    fn test_process_applies_in_order() {
        let s = seq(&[(OpKind::XorShiftLeft, 13), (OpKind::Mul, MUL_CONSTANTS[0])]);
        let x = 0x0123_4567_89ab_cdef_u64;
        let step1 = x ^ (x << 13);
        let expect = step1.wrapping_mul(MUL_CONSTANTS[0] | 1);
        assert_eq!(s.process(x), expect);

        // Reversed order produces a different digest.
        let s2 = seq(&[(OpKind::Mul, MUL_CONSTANTS[0]), (OpKind::XorShiftLeft, 13)]);
        assert_ne!(s.process(x), s2.process(x));
    }

    #[test]
    fn test_try_from_ops_rejects_adjacent_duplicates() {
        let ops = vec![
            Op::from_parts(OpKind::Mul, 3).unwrap(),
            Op::from_parts(OpKind::Mul, 5).unwrap(),
        ];
        assert_eq!(
            OpSequence::try_from_ops(ops).unwrap_err(),
            HashForgeError::adjacency_violation(0)
        );
    }

    #[test]
    fn test_try_from_ops_allows_shift_runs() {
        let s = seq(&[
            (OpKind::RotateRight, 48),
            (OpKind::RotateRight, 40),
            (OpKind::XorShiftRight, 34),
        ]);
        assert!(s.is_adjacency_legal());
    }

    #[test]
    fn test_insertion_legality_checks_both_sides() {
        let s = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7)]);
        // Between MUL and ADD: another MUL would sit after MUL -> illegal.
        assert!(!s.insertion_is_legal(1, OpKind::Mul));
        // ADD in front of ADD -> illegal.
        assert!(!s.insertion_is_legal(1, OpKind::Add));
        assert!(s.insertion_is_legal(1, OpKind::Xor));
        // At the ends only one neighbor matters.
        assert!(!s.insertion_is_legal(0, OpKind::Mul));
        assert!(s.insertion_is_legal(0, OpKind::Add));
        assert!(!s.insertion_is_legal(2, OpKind::Add));
    }

    #[test]
    fn test_removal_legality() {
        let s = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7), (OpKind::Mul, 5)]);
        // Removing the middle ADD would join MUL-MUL.
        assert!(!s.removal_is_legal(1));
        assert!(s.removal_is_legal(0));
        assert!(s.removal_is_legal(2));
    }

    #[test]
    fn test_rewrite_legality() {
        let s = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7), (OpKind::Xor, 5)]);
        assert!(!s.rewrite_is_legal(1, OpKind::Mul));
        assert!(!s.rewrite_is_legal(1, OpKind::Xor));
        assert!(s.rewrite_is_legal(1, OpKind::Sub));
    }

    #[test]
    fn test_remove_then_reinsert_is_exact_rollback() {
        let original = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7), (OpKind::Xor, 5)]);
        let mut s = original.clone();
        let op = s.remove(1);
        s.insert(1, op);
        assert_eq!(s, original);
    }

    #[test]
    fn test_modify_then_restore_is_exact_rollback() {
        let original = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7)]);
        let mut s = original.clone();
        let (k, a) = s.modify(1, OpKind::Xor, 99);
        assert_eq!((k, a), (OpKind::Add, 7));
        s.modify(1, k, a);
        assert_eq!(s, original);
    }

    #[test]
    fn test_swap_twice_is_exact_rollback() {
        let original = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7), (OpKind::Xor, 5)]);
        let mut s = original.clone();
        s.swap_contents(0, 2);
        assert_ne!(s, original);
        s.swap_contents(0, 2);
        assert_eq!(s, original);
    }

    #[test]
    fn test_swap_preserves_slot_ids() {
        let mut s = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7)]);
        let ids: Vec<u64> = s.ops().iter().map(|op| op.slot_id()).collect();
        s.swap_contents(0, 1);
        let after: Vec<u64> = s.ops().iter().map(|op| op.slot_id()).collect();
        assert_eq!(ids, after);
        assert_eq!(s.ops()[0].kind(), OpKind::Add);
    }

    #[test]
    fn test_position_of_tracks_slot() {
        let mut s = seq(&[(OpKind::Mul, 3), (OpKind::Add, 7)]);
        let id = s.ops()[1].slot_id();
        s.insert(0, Op::from_parts(OpKind::Xor, 1).unwrap());
        assert_eq!(s.position_of(id), Some(2));
        s.remove(2);
        assert_eq!(s.position_of(id), None);
    }

    #[test]
    fn test_display_renders_program() {
        let s = seq(&[
            (OpKind::RotateRight, 48),
            (OpKind::Mul, 0x2127_599b_f432_5c37),
            (OpKind::XorShiftRight, 34),
        ]);
        assert_eq!(format!("{s}"), "ROR(48) MUL(2127599bf4325c37) XSR(34)");
    }
}
