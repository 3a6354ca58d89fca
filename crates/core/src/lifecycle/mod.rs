//! Soft-delete lifecycle shared by every entity.
//!
//! Entities carry a nullable `deleted_at` marker. `Activatable` exposes it,
//! `SoftDeletePolicy` decides whether a delete or restore transition is legal.

pub mod policy;

#[cfg(test)]
mod policy_props;

pub use policy::{Activatable, EntityKind, LifecycleState, SoftDeletePolicy};
