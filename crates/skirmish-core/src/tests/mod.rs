//! Scenario, integration and property tests.
//!
//! # Test Structure
//!
//! - `scenarios.rs`: the reference behaviors of stacking, refresh, taunt
//!   countdown, dispel ordering and phase rejection
//! - `integration.rs`: whole battles driven through [`Battle`](crate::battle::Battle)
//! - `determinism.rs`: same seed, same event log
//! - `properties.rs`: proptest checks of the stacking cap and dispel counts
//! - `helpers.rs`: skill catalog and battle setup shared by the above

mod determinism;
mod helpers;
mod integration;

// Re-export for convenience
pub use helpers::*;
