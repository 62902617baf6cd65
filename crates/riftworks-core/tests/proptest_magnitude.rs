//! Property-based tests for magnitude vectors.
//!
//! Uses proptest to generate random sparse vectors over a small key space
//! (so keys overlap often) and verify the algebraic invariants hold.

use std::collections::BTreeMap;

use proptest::prelude::*;
use riftworks_core::fixed::Fixed64;
use riftworks_core::magnitude::MagnitudeVector;

// ===========================================================================
// Generators
// ===========================================================================

const KEYS: [&str; 6] = ["death", "hostile", "medical", "power", "atmos", "anomaly"];

/// Raw Q32.32 bits kept well inside the range so sums never overflow.
fn arb_magnitude() -> impl Strategy<Value = Fixed64> {
    (-(1i64 << 44)..(1i64 << 44)).prop_map(Fixed64::from_bits)
}

fn arb_vector() -> impl Strategy<Value = MagnitudeVector> {
    proptest::collection::btree_map(
        proptest::sample::select(KEYS.to_vec()).prop_map(str::to_string),
        arb_magnitude(),
        0..KEYS.len(),
    )
    .prop_map(|entries: BTreeMap<String, Fixed64>| MagnitudeVector::from(entries))
}

fn arb_range() -> impl Strategy<Value = (Fixed64, Fixed64)> {
    (arb_magnitude(), arb_magnitude())
        .prop_filter("min must be below max", |(a, b)| a != b)
        .prop_map(|(a, b)| if a < b { (a, b) } else { (b, a) })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Adding then subtracting restores every original value exactly. Keys
    /// introduced by B linger as explicit zeros, so compare after trimming.
    #[test]
    fn add_then_subtract_is_exact(a in arb_vector(), b in arb_vector()) {
        let back = &(&a + &b) - &b;
        for (key, value) in a.iter() {
            prop_assert_eq!(back.get(key), Some(value));
        }
        let mut trimmed_back = back.clone();
        trimmed_back.trim_zeros();
        let mut trimmed_a = a.clone();
        trimmed_a.trim_zeros();
        prop_assert_eq!(trimmed_back, trimmed_a);
    }

    /// Exclusive combinators never introduce keys from the operand.
    #[test]
    fn exclusive_ops_keep_receiver_keys(a in arb_vector(), b in arb_vector()) {
        let sum = a.exclusive_add(&b);
        let diff = a.exclusive_subtract(&b);
        let a_keys: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(sum.iter().map(|(k, _)| k).collect::<Vec<_>>(), a_keys.clone());
        prop_assert_eq!(diff.iter().map(|(k, _)| k).collect::<Vec<_>>(), a_keys);
    }

    /// Clamp leaves every entry within range and adds no keys.
    #[test]
    fn clamp_bounds_entries(a in arb_vector(), (min, max) in arb_range()) {
        let mut clamped = a.clone();
        clamped.clamp(min, max);
        prop_assert_eq!(clamped.len(), a.len());
        for (key, value) in clamped.iter() {
            prop_assert!(a.contains_key(key));
            prop_assert!(value >= min && value <= max);
        }
    }

    /// Trimming twice is the same as trimming once.
    #[test]
    fn trim_zeros_is_idempotent(a in arb_vector(), zeros in proptest::sample::subsequence(KEYS.to_vec(), 0..3)) {
        let mut v = a;
        for key in zeros {
            v.set(key, Fixed64::ZERO);
        }
        v.trim_zeros();
        let once = v.clone();
        v.trim_zeros();
        prop_assert_eq!(v.clone(), once);
        prop_assert!(v.iter().all(|(_, value)| value != Fixed64::ZERO));
    }

    /// A vector is never worse than itself, and never better than itself
    /// unless it has no entries.
    #[test]
    fn self_comparison(a in arb_vector()) {
        prop_assert!(!a.any_worse_than(&a));
        prop_assert_eq!(a.all_better_than(&a), a.is_empty());
    }

    /// Anything compared against an empty vector is "all better" and never
    /// "any worse".
    #[test]
    fn empty_operand_is_incomparable(a in arb_vector()) {
        let empty = MagnitudeVector::new();
        prop_assert!(!a.any_worse_than(&empty));
        prop_assert!(a.all_better_than(&empty));
    }

    /// Negation is multiplication by -1 and cancels under addition.
    #[test]
    fn negation_cancels(a in arb_vector()) {
        let neg = -&a;
        prop_assert_eq!(neg.clone(), &a * Fixed64::from_num(-1));
        let sum = &a + &neg;
        prop_assert!(sum.iter().all(|(_, v)| v == Fixed64::ZERO));
        prop_assert_eq!(sum.len(), a.len());
    }

    /// Total distributes over union addition.
    #[test]
    fn total_is_additive(a in arb_vector(), b in arb_vector()) {
        prop_assert_eq!((&a + &b).total(), a.total() + b.total());
    }
}
