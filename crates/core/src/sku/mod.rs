//! SKU derivation for product variants.

pub mod generator;

#[cfg(test)]
mod generator_props;

pub use generator::SkuGenerator;
