//! Authorization rules.
//!
//! Callers arrive with an already-verified identity and role. This module
//! decides what that role is allowed to do.

pub mod role;

pub use role::{Capability, Role};
