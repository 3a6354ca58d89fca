//! Reversal of sale-item allocations.

pub mod service;

#[cfg(test)]
mod service_props;

pub use service::{BatchRestoration, RecordedAllocation, ReversalInput, ReversalPlan, ReversalService};
