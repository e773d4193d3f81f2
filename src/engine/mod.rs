//! The mutation/acceptance controller.
//!
//! [`HashForge`] owns the live [`OpSequence`] and evolves it with four
//! independent mutator roles — Add, Delete, Modify, Swap — plus one
//! background argument mutator per live operation. Every role loops
//! forever: draw randomness from its own PRNG, propose an edit, and run
//! the shared critical section
//!
//! ```text
//! lock -> apply edit -> score -> accept or roll back -> unlock
//! ```
//!
//! # Acceptance
//!
//! The very first evaluation unconditionally becomes the BestSeen baseline
//! regardless of score. Afterwards a proposal is accepted iff its score is
//! strictly below the best seen; acceptance snapshots the live sequence
//! into [`BestSeen`], rejection restores the live sequence to its
//! pre-mutation contents exactly.
//!
//! # Concurrency
//!
//! One `parking_lot::Mutex` guards the sequence, the BestSeen snapshot and
//! the scorer. Scoring runs *inside* the critical section, so no role ever
//! evaluates a half-mutated sequence and no two roles evaluate
//! concurrently; scoring throughput, not mutation throughput, is the
//! bottleneck. There is no ordering guarantee between roles — any
//! interleaving of accepted edits is legal, and the adjacency and length
//! invariants hold after every one of them.
//!
//! Shutdown is cooperative: [`HashForge::stop`] flags every worker and
//! joins them; latency is bounded by one in-flight evaluation.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use hashforge::{HashForge, Tunables};
//!
//! let forge = HashForge::new(Arc::new(Tunables::new()));
//! forge.start();
//! std::thread::sleep(std::time::Duration::from_secs(60));
//! forge.stop();
//! if let Some(report) = forge.report() {
//!     println!("{report}");
//! }
//! ```

mod worker;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::config::Tunables;
use crate::fitness::Avalanche;
use crate::hash::hash_value;
use crate::ops::{normalize_arg, Op, OpKind};
use crate::rng::Nr3Rng;
use crate::sequence::OpSequence;
use crate::Result;

use worker::Worker;

/// Bounded retries for adjacency-legal kind draws inside one proposal.
const MAX_DRAW_TRIES: usize = 16;

/// Snapshot of the best-scoring configuration observed so far.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestSeen {
    /// The operation program, in execution order.
    pub ops: Vec<Op>,
    /// Its fitness score; lower is better.
    pub score: f64,
}

impl fmt::Display for BestSeen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Best seen combination:")?;
        for op in &self.ops {
            write!(f, " {op}")?;
        }
        write!(f, "\t{:.6}", self.score)
    }
}

/// Cumulative proposal counters, sampled with Relaxed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Evaluated proposals, including the baseline evaluation.
    pub proposals: u64,
    /// Accepted proposals, including the baseline evaluation.
    pub accepted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Add,
    Delete,
    Modify,
    Swap,
}

impl Role {
    fn thread_name(self) -> &'static str {
        match self {
            Role::Add => "hashforge-add",
            Role::Delete => "hashforge-del",
            Role::Modify => "hashforge-mod",
            Role::Swap => "hashforge-swap",
        }
    }
}

/// Everything the single search lock protects.
struct SearchState {
    seq: OpSequence,
    best: Option<BestSeen>,
    scorer: Avalanche,
}

/// State shared between the public handle and every worker thread.
struct Shared {
    /// Self-reference so methods running under a plain `&self` can hand
    /// worker closures an owning `Arc`.
    me: Weak<Shared>,
    tunables: Arc<Tunables>,
    state: Mutex<SearchState>,
    workers: Mutex<Vec<Worker>>,
    running: AtomicBool,
    proposals: AtomicU64,
    accepted: AtomicU64,
}

/// The search engine: live sequence, mutator roles, acceptance state.
pub struct HashForge {
    shared: Arc<Shared>,
}

impl HashForge {
    /// Create an engine with an empty sequence.
    #[must_use]
    pub fn new(tunables: Arc<Tunables>) -> Self {
        let shared = Arc::new_cyclic(|me| Shared {
            me: me.clone(),
            tunables,
            state: Mutex::new(SearchState {
                seq: OpSequence::new(),
                best: None,
                scorer: Avalanche::new(),
            }),
            workers: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            proposals: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
        });
        Self { shared }
    }

    /// Create an engine seeded with a known-good baseline sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline violates the adjacency rule or the
    /// configured length bounds.
    pub fn with_baseline(tunables: Arc<Tunables>, ops: Vec<Op>) -> Result<Self> {
        let (min, max) = (tunables.min_seq(), tunables.max_seq());
        if ops.len() < min || ops.len() > max {
            return Err(crate::HashForgeError::sequence_length_out_of_bounds(
                ops.len(),
                min,
                max,
            ));
        }
        let seq = OpSequence::try_from_ops(ops)?;
        let engine = Self::new(tunables);
        engine.shared.state.lock().seq = seq;
        Ok(engine)
    }

    /// The shared tunables handle.
    #[must_use]
    pub fn tunables(&self) -> &Arc<Tunables> {
        &self.shared.tunables
    }

    /// Hash a buffer through the live operation sequence.
    ///
    /// Pure for a fixed sequence; while the search runs, the sequence
    /// changes between calls and digests jitter accordingly.
    #[must_use]
    pub fn gen_hash(&self, buf: &[u8]) -> u64 {
        hash_value(buf, &self.shared.state.lock().seq)
    }

    /// Snapshot the best configuration seen so far.
    #[must_use]
    pub fn best_seen(&self) -> Option<BestSeen> {
        self.shared.state.lock().best.clone()
    }

    /// Render the best-seen configuration as a human-readable line.
    #[must_use]
    pub fn report(&self) -> Option<String> {
        self.best_seen().map(|best| best.to_string())
    }

    /// Cumulative proposal/acceptance counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            proposals: self.shared.proposals.load(Ordering::Relaxed),
            accepted: self.shared.accepted.load(Ordering::Relaxed),
        }
    }

    /// Whether the mutator roles are currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Spawn the four mutator roles and one argument mutator per existing
    /// operation. Idempotent: a second call while running is a no-op.
    pub fn start(&self) {
        let shared = &self.shared;
        if shared.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let seeded_ids: Vec<u64> = {
            let state = shared.state.lock();
            state.seq.ops().iter().map(Op::slot_id).collect()
        };

        let mut workers = shared.workers.lock();
        for role in [Role::Add, Role::Delete, Role::Modify, Role::Swap] {
            let engine = Arc::clone(shared);
            let mut rng = Nr3Rng::from_entropy();
            workers.push(Worker::spawn(role.thread_name().to_string(), move || {
                engine.step(role, &mut rng);
                true
            }));
        }
        for id in seeded_ids {
            workers.push(shared.arg_worker(Arc::clone(shared), id));
        }
    }

    /// Flag every worker and join them. Latency is bounded by one
    /// in-flight critical section.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut drained: Vec<Worker> = {
            let mut workers = self.shared.workers.lock();
            workers.drain(..).collect()
        };
        for w in &drained {
            w.stop();
        }
        for w in &mut drained {
            w.join();
        }
    }
}

impl Drop for HashForge {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn step(&self, role: Role, rng: &mut Nr3Rng) {
        match role {
            Role::Add => self.add_op(rng),
            Role::Delete => self.del_op(rng),
            Role::Modify => self.mod_op(rng),
            Role::Swap => self.swap_op(rng),
        }
    }

    /// Add role: grow the sequence by one adjacency-legal operation.
    fn add_op(&self, rng: &mut Nr3Rng) {
        let mut state = self.state.lock();

        if state.seq.is_empty() {
            // The deliberately worst primitive never opens a sequence.
            let kind = loop {
                let k = OpKind::from_draw(rng.next_u64());
                if k != OpKind::Add {
                    break k;
                }
            };
            let op = Op::new(kind, rng.next_u64());
            let id = op.slot_id();
            state.seq.insert(0, op);
            // No better sequence exists yet; the evaluation seeds BestSeen.
            self.evaluate_locked(&mut state);
            log::info!("seeded empty sequence with {}", state.seq);
            drop(state);
            self.register_arg_worker(id);
            return;
        }

        if state.seq.len() >= self.tunables.max_seq() {
            return;
        }

        let pos = (rng.next_u64() % (state.seq.len() as u64 + 1)) as usize;
        let mut drawn = None;
        for _ in 0..MAX_DRAW_TRIES {
            let kind = OpKind::from_draw(rng.next_u64());
            if state.seq.insertion_is_legal(pos, kind) {
                drawn = Some(kind);
                break;
            }
        }
        let Some(kind) = drawn else { return };

        let op = Op::new(kind, rng.next_u64());
        let id = op.slot_id();
        state.seq.insert(pos, op);
        if self.evaluate_locked(&mut state) {
            log::debug!("add accepted: {} at pos={}", state.seq.ops()[pos], pos);
            drop(state);
            self.register_arg_worker(id);
        } else {
            let op = state.seq.remove(pos);
            log::debug!("add rejected: {op} at pos={pos}");
        }
    }

    /// Delete role: shrink the sequence once it exceeds the lower bound.
    fn del_op(&self, rng: &mut Nr3Rng) {
        let mut state = self.state.lock();

        if state.seq.len() <= self.tunables.min_seq() {
            return;
        }
        let legal: Vec<usize> = (0..state.seq.len())
            .filter(|&p| state.seq.removal_is_legal(p))
            .collect();
        if legal.is_empty() {
            return;
        }
        let pos = legal[(rng.next_u64() % legal.len() as u64) as usize];
        let op = state.seq.remove(pos);
        if self.evaluate_locked(&mut state) {
            log::debug!("delete accepted: {op} from pos={pos}");
        } else {
            state.seq.insert(pos, op);
        }
    }

    /// Modify role: rewrite one slot's kind and argument in place.
    fn mod_op(&self, rng: &mut Nr3Rng) {
        let mut state = self.state.lock();

        if state.seq.is_empty() {
            return;
        }
        let pos = (rng.next_u64() % state.seq.len() as u64) as usize;
        let mut drawn = None;
        for _ in 0..MAX_DRAW_TRIES {
            let kind = OpKind::from_draw(rng.next_u64());
            if state.seq.rewrite_is_legal(pos, kind) {
                drawn = Some(kind);
                break;
            }
        }
        let Some(kind) = drawn else { return };

        let arg = normalize_arg(kind, rng.next_u64());
        let (old_kind, old_arg) = state.seq.modify(pos, kind, arg);
        if self.evaluate_locked(&mut state) {
            log::debug!("modify accepted at pos={}: {}", pos, state.seq.ops()[pos]);
        } else {
            state.seq.modify(pos, old_kind, old_arg);
        }
    }

    /// Swap role: exchange the contents of two distinct slots.
    fn swap_op(&self, rng: &mut Nr3Rng) {
        let mut state = self.state.lock();

        if state.seq.len() < 2 {
            return;
        }
        let rnd = rng.next_u64();
        let pos1 = ((rnd >> 32) % state.seq.len() as u64) as usize;
        let pos2 = (u64::from(rnd as u32) % state.seq.len() as u64) as usize;
        if pos1 == pos2 {
            return;
        }
        state.seq.swap_contents(pos1, pos2);
        if !state.seq.is_adjacency_legal() {
            // Undone without scoring; a skipped draw, not a rejection.
            state.seq.swap_contents(pos1, pos2);
            return;
        }
        if self.evaluate_locked(&mut state) {
            log::debug!("swap accepted: pos1={pos1} pos2={pos2}");
        } else {
            state.seq.swap_contents(pos1, pos2);
        }
    }

    /// Argument mutator body: redraw one slot's argument in place.
    /// Returns `false` once the slot no longer exists.
    fn arg_op(&self, id: u64, rng: &mut Nr3Rng) -> bool {
        let mut state = self.state.lock();

        let Some(pos) = state.seq.position_of(id) else {
            return false;
        };
        let old_arg = state.seq.ops()[pos].arg();
        state.seq.op_mut(pos).redraw_arg(rng.next_u64());
        if self.evaluate_locked(&mut state) {
            log::debug!(
                "arg optimized at pos={}: {:016x} -> {:016x}",
                pos,
                old_arg,
                state.seq.ops()[pos].arg()
            );
        } else {
            let kind = state.seq.ops()[pos].kind();
            state.seq.modify(pos, kind, old_arg);
        }
        true
    }

    fn arg_worker(&self, engine: Arc<Shared>, id: u64) -> Worker {
        let mut rng = Nr3Rng::from_entropy();
        Worker::spawn(format!("hashforge-arg-{id}"), move || {
            engine.arg_op(id, &mut rng)
        })
    }

    /// Attach an argument mutator to a newly accepted operation. Skipped
    /// when the engine is stopping or tearing down; `start` re-attaches
    /// workers for every live op, so nothing is lost across a stop/start
    /// cycle.
    fn register_arg_worker(&self, id: u64) {
        let Some(this) = self.me.upgrade() else {
            return;
        };
        let mut workers = self.workers.lock();
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        // Reap workers whose ops were deleted and which have resigned.
        workers.retain_mut(|w| {
            if w.is_finished() {
                w.join();
                false
            } else {
                true
            }
        });
        workers.push(self.arg_worker(this, id));
    }

    /// Score the live sequence and decide acceptance. Runs entirely under
    /// the state lock; the caller rolls the mutation back on `false`.
    fn evaluate_locked(&self, state: &mut SearchState) -> bool {
        let weights = self.tunables.weights();
        let len = self.tunables.aval_byte();
        let times = self.tunables.aval_times();
        self.proposals.fetch_add(1, Ordering::Relaxed);

        let SearchState { seq, best, scorer } = state;
        let (base, elapsed) = scorer.score(|buf| hash_value(buf, seq), len, times, &weights);
        let time_score = elapsed.as_secs_f64() * weights.time_rate;
        let new_score = base + time_score;

        let accepted = record_outcome(best, seq, new_score);
        if accepted {
            self.accepted.fetch_add(1, Ordering::Relaxed);
            log::info!(
                "best seen updated: aval_score={:.6} time_score={:.6} overall={:.6} [{}]",
                base,
                time_score,
                new_score,
                seq
            );
        }
        accepted
    }
}

/// The shared acceptance rule: the first evaluation seeds BestSeen
/// unconditionally; afterwards only a strictly lower score replaces it.
fn record_outcome(best: &mut Option<BestSeen>, seq: &OpSequence, new_score: f64) -> bool {
    match best {
        None => {
            *best = Some(BestSeen {
                ops: seq.snapshot(),
                score: new_score,
            });
            true
        }
        Some(b) if new_score < b.score => {
            b.ops = seq.snapshot();
            b.score = new_score;
            true
        }
        _ => false,
    }
}
