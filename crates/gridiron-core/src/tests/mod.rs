//! Engine-level tests.
//!
//! - `determinism.rs`: same seed, same game
//! - `integration.rs`: full games through the orchestrator
//! - `scenarios.rs`: fixed-dice situations with known answers
//! - `decisions.rs`: pausing and resuming on human decisions
//! - `properties.rs`: proptest invariants over states and seeds
//! - `helpers.rs`: builders and fixtures

mod helpers;
mod scenarios;

// Re-export for convenience
pub use helpers::*;
