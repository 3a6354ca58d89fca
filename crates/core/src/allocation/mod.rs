//! FIFO allocation of sale quantities across stock batches.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::AllocationService;
pub use types::{AllocationPlan, AllocationRequest, BatchPortion, CandidateBatch};
