//! Large-table smoke tests near the practical size of a single flock.
//!
//! Run with: cargo test -p credence-tests --release -- --ignored

use credence_core::{Argument, Distribution, Flock, MAX_VARIABLES};
use credence_tests::{args, assert_close, pseudo_random_table};

fn arguments(range: std::ops::Range<u32>) -> Vec<Argument> {
    range.map(Argument).collect()
}

#[test]
#[ignore]
fn huge_refinement() {
    let mut flock = Flock::new(arguments(0..25), vec![]).expect("flock");
    flock.refine(Argument(0), true, 1.0).expect("refine");
    assert_close(flock.total_mass(), 1.0, 1e-9, "mass");
}

#[test]
#[ignore]
fn huge_marginalization() {
    let flock = Flock::new(arguments(0..25), vec![]).expect("flock");
    let marginal = flock.marginalize(&args(&[0]));
    assert_close(marginal.table()[1], 0.5, 1e-9, "marginal");
}

#[test]
#[ignore]
fn huge_combination() {
    let left = Flock::new(arguments(0..12), args(&[12])).expect("left");
    let right = Flock::new(arguments(12..25), vec![]).expect("right");
    let combined = left.combine(&right).expect("combine");
    assert_eq!(combined.size(), 25);
    assert!(combined.conditioning().is_empty());
}

#[test]
fn combination_past_the_ceiling_is_rejected_before_allocating() {
    let half = (MAX_VARIABLES / 2 + 1) as u32;
    let left = Flock::new(arguments(0..half), vec![]).expect("left");
    let right = Flock::new(arguments(half..2 * half), vec![]).expect("right");
    assert!(left.combine(&right).is_err());
}

#[test]
fn query_shrinks_operands_that_would_overflow() {
    // 16 + 16 variables cannot be joined directly
    let root = Flock::with_table(arguments(0..16), vec![], pseudo_random_table(1 << 16, 23))
        .expect("root");
    let leaf = Flock::with_table(arguments(16..31), args(&[0]), pseudo_random_table(1 << 16, 29))
        .expect("leaf");
    assert!(root.size() + leaf.size() > MAX_VARIABLES);

    let small_root = Flock::with_table(
        args(&[0]),
        vec![],
        root.marginalize(&args(&[0])).table().to_vec(),
    )
    .expect("small root");
    let small_leaf = Flock::with_table(
        args(&[16]),
        args(&[0]),
        leaf.marginalize(&args(&[16])).table().to_vec(),
    )
    .expect("small leaf");

    let mut wide = Distribution::new(vec![root, leaf]).expect("wide");
    let mut narrow = Distribution::new(vec![small_root, small_leaf]).expect("narrow");
    wide.refine(Argument(16), true, 0.5).expect("refine wide");
    narrow.refine(Argument(16), true, 0.5).expect("refine narrow");

    let expected = narrow.query(&args(&[16])).expect("narrow query")[&Argument(16)];
    let actual = wide.query(&args(&[16])).expect("wide query")[&Argument(16)];
    assert_close(actual, expected, 1e-12, "belief 16");
}
