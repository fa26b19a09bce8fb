//! # Gridiron Core
//!
//! Play resolution and game-state engine for a tabletop football game.
//!
//! Two sides call an offensive and a defensive card each down. The engine
//! resolves the pairing into an outcome, adjudicates penalties, runs the
//! special-teams sub-engines, and advances down, distance, clock and score.
//! Every random draw goes through one injected
//! [`RandomSource`](playbook::RandomSource), so a seeded game replays exactly.
//!
//! ## Architecture
//!
//! - **Resolvers**: chart cells or 2d20 matchup tables ([`resolver`])
//! - **Adjudication**: penalties ([`penalty`]), special teams
//!   ([`special_teams`]), downs and scoring ([`tracker`]), time ([`clock`])
//! - **Orchestration**: the per-down transaction with pausable decisions
//!   ([`game`]) and parallel seeded batches ([`batch`])
//! - **Computer coaches**: [`ai`]
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use gridiron_core::{ChartResolver, GameBuilder, Progress};
//! use playbook::data::{standard_catalog, standard_chart};
//!
//! let mut game = GameBuilder::new()
//!     .catalog(Arc::new(standard_catalog().unwrap()))
//!     .resolver(Arc::new(ChartResolver::new(Arc::new(standard_chart().unwrap()))))
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(game.start().unwrap(), Progress::Resolved);
//! let call = game.ai_call().unwrap();
//! game.resolve_down(&call).unwrap();
//! assert!(game.state().check_invariants().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ai;
pub mod batch;
pub mod call;
pub mod clock;
pub mod config;
pub mod decision;
pub mod error;
pub mod event;
pub mod game;
pub mod penalty;
pub mod resolver;
pub mod special_teams;
pub mod state;
pub mod stats;
pub mod tracker;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use ai::CoachProfile;
pub use batch::{simulate_batch, simulate_game, BatchSummary, GameSetup, GameSummary};
pub use call::PlayCall;
pub use config::EngineConfig;
pub use decision::{Decision, DecisionKind, DecisionRequest};
pub use error::{CallError, ConfigError, EngineError};
pub use event::GameEvent;
pub use game::{Controller, Game, GameBuilder, Progress};
pub use resolver::{ChartResolver, DiceTableResolver, PlayResolver};
pub use state::{GameFlags, GameState, Score, Side};
pub use stats::{GameStats, SideStats};
