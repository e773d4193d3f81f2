//! End-to-end tests: the absorbing construction plus a realistic operation
//! sequence, and the full engine running on real threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hashforge::fitness::{avalanche_component, Avalanche};
use hashforge::ops::{Op, OpKind};
use hashforge::sequence::OpSequence;
use hashforge::{hash_value, HashForge, Tunables};

/// The known-good reference sequence: two rotations, a curated multiply,
/// and a closing xorshift.
fn reference_ops() -> Vec<Op> {
    vec![
        Op::from_parts(OpKind::RotateRight, 48).unwrap(),
        Op::from_parts(OpKind::RotateRight, 40).unwrap(),
        Op::from_parts(OpKind::Mul, 0x2127_599b_f432_5c37).unwrap(),
        Op::from_parts(OpKind::XorShiftRight, 34).unwrap(),
    ]
}

fn small_tunables() -> Arc<Tunables> {
    let t = Tunables::new();
    t.set_aval_byte(4).unwrap();
    t.set_aval_times(2).unwrap();
    Arc::new(t)
}

#[test]
fn reference_sequence_diffuses_single_byte_changes() {
    let seq = OpSequence::try_from_ops(reference_ops()).unwrap();

    // Across many one-byte-apart input pairs, digests should differ in
    // roughly half their bits on average.
    let mut total_flips = 0u64;
    let trials = 1000u64;
    for i in 0..trials {
        let mut a = [0u8; 47];
        for (j, byte) in a.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(31).wrapping_add(j as u8);
        }
        let mut b = a;
        b[(i % 47) as usize] ^= 0x20;
        total_flips += (hash_value(&a, &seq) ^ hash_value(&b, &seq)).count_ones() as u64;
    }
    let mean = total_flips as f64 / trials as f64;
    assert!(
        (24.0..=40.0).contains(&mean),
        "mean flipped bits {mean}, expected near 32"
    );
}

#[test]
fn reference_sequence_avalanche_component_is_bounded() {
    let seq = OpSequence::try_from_ops(reference_ops()).unwrap();
    let mut aval = Avalanche::with_seed(0x5eed);
    let mat = aval.measure(|buf| hash_value(buf, &seq), 47, 5000);
    let component = avalanche_component(&mat);
    assert!(
        component < 50.0,
        "avalanche component {component} exceeds the generous bound"
    );
}

#[test]
fn gen_hash_is_total_for_all_small_lengths() {
    let forge = HashForge::with_baseline(Arc::new(Tunables::new()), reference_ops()).unwrap();
    let data = [0x3cu8; 64];
    for len in 0..=64 {
        let a = forge.gen_hash(&data[..len]);
        let b = forge.gen_hash(&data[..len]);
        assert_eq!(a, b, "len={len}");
    }
}

#[test]
fn search_run_preserves_invariants_and_finds_a_baseline() {
    let tunables = small_tunables();
    let forge = Arc::new(HashForge::new(Arc::clone(&tunables)));

    forge.start();

    // Wait for real mutation traffic rather than sleeping blindly.
    let deadline = Instant::now() + Duration::from_secs(10);
    while forge.stats().proposals < 50 {
        assert!(
            Instant::now() < deadline,
            "mutator roles made no progress: {:?}",
            forge.stats()
        );
        std::thread::sleep(Duration::from_millis(5));
    }

    forge.stop();

    let best = forge.best_seen().expect("a baseline must have been seeded");
    assert!(best.score.is_finite());
    assert!(!best.ops.is_empty());
    assert!(
        best.ops.len() <= tunables.max_seq(),
        "best length {} over max {}",
        best.ops.len(),
        tunables.max_seq()
    );
    // Re-validating through the public constructor checks adjacency.
    assert!(OpSequence::try_from_ops(best.ops).is_ok());

    let stats = forge.stats();
    assert!(stats.accepted >= 1);
    assert!(stats.accepted <= stats.proposals);

    let report = forge.report().unwrap();
    assert!(report.contains("Best seen combination:"));
}

#[test]
fn stopped_engine_can_be_restarted() {
    let tunables = small_tunables();
    let forge = Arc::new(HashForge::with_baseline(tunables, reference_ops()).unwrap());

    forge.start();
    std::thread::sleep(Duration::from_millis(50));
    forge.stop();
    let first = forge.stats().proposals;
    assert!(first > 0);

    forge.start();
    let deadline = Instant::now() + Duration::from_secs(10);
    while forge.stats().proposals <= first {
        assert!(Instant::now() < deadline, "no progress after restart");
        std::thread::sleep(Duration::from_millis(5));
    }
    forge.stop();
}

#[test]
fn gen_hash_stays_usable_while_search_runs() {
    let tunables = small_tunables();
    let forge = Arc::new(HashForge::with_baseline(tunables, reference_ops()).unwrap());

    forge.start();
    for i in 0..200u32 {
        // Digests jitter as the sequence evolves; the call must stay total.
        let _ = forge.gen_hash(&i.to_le_bytes());
    }
    forge.stop();
}
