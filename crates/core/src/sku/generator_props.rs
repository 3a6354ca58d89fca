//! Property-based tests for SKU generation.

use std::collections::HashSet;

use proptest::prelude::*;

use crate::sku::SkuGenerator;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Normalized parts only contain `[A-Z0-9-]`, never `--`, never edge hyphens.
    #[test]
    fn prop_normalized_shape(raw in "\\PC{0,40}") {
        let part = SkuGenerator::normalize_part(&raw);
        prop_assert!(part.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!part.contains("--"));
        prop_assert!(!part.starts_with('-'));
        prop_assert!(!part.ends_with('-'));
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn prop_normalize_idempotent(raw in "\\PC{0,40}") {
        let once = SkuGenerator::normalize_part(&raw);
        prop_assert_eq!(SkuGenerator::normalize_part(&once), once.clone());
    }

    /// The free candidate is never taken and shares the base prefix.
    #[test]
    fn prop_first_free_not_taken(taken_suffixes in prop::collection::hash_set(0u32..20, 0..20)) {
        let base = "DIOR-SAUVAGE";
        let taken: HashSet<String> = taken_suffixes
            .iter()
            .map(|n| SkuGenerator::candidate(base, *n))
            .collect();
        let free = SkuGenerator::first_free(base, &taken);
        prop_assert!(!taken.contains(&free));
        prop_assert!(free.starts_with(base));
    }
}
