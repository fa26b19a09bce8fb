//! Computer coaches.
//!
//! [`policy`] makes the calls and decisions; [`profile`] holds the
//! per-coach tendencies that bias them.

pub mod policy;
pub mod profile;

// Re-exports for convenience
pub use policy::{choose_defense, choose_kickoff, choose_offense, decide, FourthDownPlan};
pub use profile::CoachProfile;
