//! Shared fixtures for the credence integration tests.

use credence_core::{Argument, Distribution, Flock};

/// Table used by both dependent flocks of the three-flock chain.
pub const CHAIN_TABLE: [f64; 8] = [0.2, 0.0, 0.0, 0.8, 0.7, 0.0, 0.15, 0.15];

pub fn args(ids: &[u32]) -> Vec<Argument> {
    ids.iter().copied().map(Argument).collect()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

pub fn assert_close_vec(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_close(*a, *e, tol, &format!("cell {}", index));
    }
}

/// Single flock over {0, 1} carrying `{0.1, 0.2, 0.1, 0.6}`.
pub fn pair_distribution() -> Distribution {
    let flock = Flock::new(args(&[0, 1]), vec![]).expect("flock");
    let mut dist = Distribution::new(vec![flock]).expect("distribution");
    dist.set_probabilities(0, vec![0.1, 0.2, 0.1, 0.6])
        .expect("table");
    dist
}

/// Single flock over {0, 1} given {2}.
pub fn conditioned_distribution() -> Distribution {
    let mut flock = Flock::new(args(&[0, 1]), args(&[2])).expect("flock");
    flock
        .set_probabilities(vec![0.1, 0.0, 0.0, 0.2, 0.5, 0.0, 0.1, 0.1])
        .expect("table");
    Distribution::new(vec![flock]).expect("distribution")
}

/// Chain {0,1}|{2} -> {2,3}|{4} -> {4}.
pub fn chain_distribution() -> Distribution {
    let first = Flock::new(args(&[0, 1]), args(&[2])).expect("first");
    let second = Flock::new(args(&[2, 3]), args(&[4])).expect("second");
    let root = Flock::new(args(&[4]), vec![]).expect("root");
    let mut dist = Distribution::new(vec![first, second, root]).expect("distribution");
    dist.set_probabilities(0, CHAIN_TABLE.to_vec()).expect("first table");
    dist.set_probabilities(1, CHAIN_TABLE.to_vec()).expect("second table");
    dist
}

/// Normalized table of `len` pseudo-random cells, reproducible from `seed`.
pub fn pseudo_random_table(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        out.push(((state >> 11) as f64 + 1.0) / ((u64::MAX >> 11) as f64));
    }
    let total: f64 = out.iter().sum();
    out.iter().map(|v| v / total).collect()
}
