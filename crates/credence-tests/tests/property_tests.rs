//! Property tests for the table algebra invariants.

use credence_core::{Argument, Flock};
use credence_tests::args;
use proptest::prelude::*;

fn normalized(mut table: Vec<f64>) -> Vec<f64> {
    let total: f64 = table.iter().sum();
    for cell in &mut table {
        *cell /= total;
    }
    table
}

/// Flock over arguments `0..k`, all conditioned, with a random table.
fn flock_strategy(max_vars: usize) -> impl Strategy<Value = Flock> {
    (1..=max_vars).prop_flat_map(|k| {
        prop::collection::vec(0.01f64..1.0, 1 << k).prop_map(move |table| {
            let conditioned = (0..k as u32).map(Argument).collect();
            Flock::with_table(conditioned, vec![], table).expect("flock")
        })
    })
}

/// Keeps the entries of `ids` selected by `mask`, in order.
fn subset(ids: &[Argument], mask: u32) -> Vec<Argument> {
    ids.iter()
        .enumerate()
        .filter(|(i, _)| mask >> i & 1 == 1)
        .map(|(_, &arg)| arg)
        .collect()
}

proptest! {
    #[test]
    fn uniform_prior_sums_to_one(k in 0usize..10) {
        let flock = Flock::new((0..k as u32).map(Argument).collect(), vec![]).unwrap();
        let expected = 1.0 / (1u64 << k) as f64;
        prop_assert!(flock.table().iter().all(|&v| v == expected));
        prop_assert!((flock.total_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn refine_preserves_mass(flock in flock_strategy(6), pick in 0usize..6, positive in any::<bool>(), c in 0.0f64..=1.0) {
        let mut refined = flock.clone();
        let arg = flock.conditioned()[pick % flock.size()];
        refined.refine(arg, positive, c).unwrap();
        prop_assert!((refined.total_mass() - flock.total_mass()).abs() < 1e-9);
    }

    #[test]
    fn refine_with_zero_coefficient_is_noop(flock in flock_strategy(6), pick in 0usize..6, positive in any::<bool>()) {
        let mut refined = flock.clone();
        let arg = flock.conditioned()[pick % flock.size()];
        refined.refine(arg, positive, 0.0).unwrap();
        prop_assert_eq!(refined, flock);
    }

    #[test]
    fn refine_with_unit_coefficient_empties_disagreeing_models(flock in flock_strategy(6), pick in 0usize..6, positive in any::<bool>()) {
        let mut refined = flock.clone();
        let arg = flock.conditioned()[pick % flock.size()];
        let bit = refined.bit_of(arg).unwrap();
        refined.refine(arg, positive, 1.0).unwrap();
        for (index, &value) in refined.table().iter().enumerate() {
            if (index >> bit & 1 == 1) != positive {
                prop_assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn marginalize_preserves_mass(flock in flock_strategy(6), mask in 0u32..64) {
        let keep = subset(flock.conditioned(), mask);
        let marginal = flock.marginalize(&keep);
        prop_assert_eq!(marginal.conditioned(), keep.as_slice());
        prop_assert!((marginal.total_mass() - flock.total_mass()).abs() < 1e-9);
    }

    #[test]
    fn marginalize_twice_equals_once(flock in flock_strategy(6), outer in 0u32..64, inner in 0u32..64) {
        let first = subset(flock.conditioned(), outer);
        let second = subset(&first, inner);
        let twice = flock.marginalize(&first).marginalize(&second);
        let once = flock.marginalize(&second);
        prop_assert_eq!(twice.conditioned(), once.conditioned());
        for (a, b) in twice.table().iter().zip(once.table()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn combine_of_independent_flocks_multiplies_mass(
        left in prop::collection::vec(0.01f64..1.0, 4),
        right in prop::collection::vec(0.01f64..1.0, 8),
    ) {
        let a = Flock::with_table(args(&[0, 1]), vec![], normalized(left)).unwrap();
        let b = Flock::with_table(args(&[2, 3, 4]), vec![], normalized(right)).unwrap();
        let joint = a.combine(&b).unwrap();
        prop_assert!((joint.total_mass() - a.total_mass() * b.total_mass()).abs() < 1e-9);
    }

    #[test]
    fn combine_is_commutative_up_to_relabeling(
        left in prop::collection::vec(0.01f64..1.0, 4),
        right in prop::collection::vec(0.01f64..1.0, 4),
    ) {
        let a = Flock::with_table(args(&[0]), args(&[1]), left).unwrap();
        let b = Flock::with_table(args(&[1, 2]), vec![], right).unwrap();
        let order = args(&[0, 1, 2]);
        let ab = a.combine(&b).unwrap().marginalize(&order);
        let ba = b.combine(&a).unwrap().marginalize(&order);
        prop_assert_eq!(ab.table(), ba.table());
    }

    #[test]
    fn combine_then_marginalize_recovers_owner(
        parent in prop::collection::vec(0.01f64..1.0, 4),
        child_given_false in 0.0f64..=1.0,
        child_given_true in 0.0f64..=1.0,
    ) {
        let a = Flock::with_table(args(&[0, 1]), vec![], normalized(parent)).unwrap();
        // P(a2 | a0), normalized per parent assignment
        let b = Flock::with_table(
            args(&[2]),
            args(&[0]),
            vec![
                1.0 - child_given_false,
                child_given_false,
                1.0 - child_given_true,
                child_given_true,
            ],
        )
        .unwrap();
        let recovered = a.combine(&b).unwrap().marginalize(a.conditioned());
        prop_assert_eq!(recovered.conditioned(), a.conditioned());
        for (r, o) in recovered.table().iter().zip(a.table()) {
            prop_assert!((r - o).abs() < 1e-9);
        }
    }
}
