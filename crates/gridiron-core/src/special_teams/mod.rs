//! Special-teams sub-engines.
//!
//! Each sub-engine is a table lookup driven by its own dice and returns a
//! plain result value. Applying the result to the game (possession, score,
//! clock) is the orchestrator's job.
//!
//! - [`kickoff`]: normal kickoffs and onside kicks
//! - [`punt`]: distance, touchback, goal-line choice and returns
//! - [`place_kick`]: field goals and conversion kicks

pub mod kickoff;
pub mod place_kick;
pub mod punt;

pub use kickoff::{KickoffKind, KickoffResult};
pub use place_kick::{PlaceKickColumn, PlaceKickResult};
pub use punt::{PuntLanding, PuntResult};
