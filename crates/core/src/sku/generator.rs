//! SKU normalization and collision probing.
//!
//! A SKU is `[BRAND-]PRODUCT-VARIANT`, each part normalized to `[A-Z0-9-]`.
//! Collisions are resolved by appending `-1`, `-2`, ... to the base code.

use std::collections::HashSet;

use crate::error::StockError;

/// Stateless SKU generator.
pub struct SkuGenerator;

impl SkuGenerator {
    /// Normalizes one SKU part.
    ///
    /// Trims, uppercases, turns whitespace runs into a single hyphen, drops
    /// anything outside `[A-Z0-9-]`, collapses repeated hyphens and trims
    /// hyphens from both ends.
    #[must_use]
    pub fn normalize_part(raw: &str) -> String {
        let joined = raw.split_whitespace().collect::<Vec<_>>().join("-");

        let mut out = String::with_capacity(joined.len());
        for c in joined.to_uppercase().chars() {
            if !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-') {
                continue;
            }
            if c == '-' && out.ends_with('-') {
                continue;
            }
            out.push(c);
        }

        out.trim_matches('-').to_string()
    }

    /// Builds the base code from brand, product and variant names.
    ///
    /// Parts that normalize to empty are skipped; an empty result is a
    /// validation error.
    pub fn base_code(
        brand: Option<&str>,
        product_name: &str,
        variant_name: &str,
    ) -> Result<String, StockError> {
        let parts: Vec<String> = [brand.unwrap_or_default(), product_name, variant_name]
            .into_iter()
            .map(Self::normalize_part)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            return Err(StockError::Validation(
                "SKU base normalizes to an empty code".to_string(),
            ));
        }

        Ok(parts.join("-"))
    }

    /// The `n`th candidate for `base`: `base` itself for 0, `base-n` otherwise.
    #[must_use]
    pub fn candidate(base: &str, n: u32) -> String {
        if n == 0 {
            base.to_string()
        } else {
            format!("{base}-{n}")
        }
    }

    /// First candidate for `base` not already in `taken`.
    #[must_use]
    pub fn first_free(base: &str, taken: &HashSet<String>) -> String {
        (0..)
            .map(|n| Self::candidate(base, n))
            .find(|sku| !taken.contains(sku))
            .unwrap_or_else(|| base.to_string())
    }

    /// `LIKE` pattern matching every suffixed candidate of `base`.
    ///
    /// Bases only contain `[A-Z0-9-]`, so no `LIKE` metacharacters need
    /// escaping.
    #[must_use]
    pub fn suffix_pattern(base: &str) -> String {
        format!("{base}-%")
    }
}
