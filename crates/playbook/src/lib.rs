//! # Playbook
//!
//! Cards, dice and outcome tables for a tabletop football engine.
//!
//! Playbook is the data layer: it owns everything that is authored rather
//! than computed. Tables are loaded and validated once, then only read.
//!
//! - **Cards**: offensive decks and defensive cards with their call
//!   restrictions ([`CardCatalog`])
//! - **Charts**: free-text result cells parsed at load time ([`Chart`])
//! - **Matchup books**: 2d20 sum tables with doubles overrides and a penalty
//!   sub-table ([`MatchupBook`])
//! - **Dice**: the [`RandomSource`] every random draw goes through
//!
//! ## Quick Start
//!
//! ```
//! use playbook::{data, Roll};
//!
//! let catalog = data::standard_catalog().unwrap();
//! let chart = data::standard_chart().unwrap();
//!
//! let card = catalog.offense_card("pro-sideline-pass").unwrap();
//! let defense = catalog.defense_by_label("4-3 Base").unwrap();
//! let cell = chart.lookup(&card.deck, &card.label, defense.letter).unwrap();
//! assert!(cell.out_of_bounds);
//!
//! let book = data::standard_matchups().unwrap();
//! assert!(book.lookup("pro-short-pass", "def-nickel", Roll::new(4, 11)).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod chart;
pub mod data;
pub mod dice;
pub mod error;
pub mod matchup;
pub mod outcome;
pub mod validation;

// Re-exports for convenience
pub use card::{CardCatalog, DefenseCard, DefenseCategory, Deck, OffenseCard, OffenseCategory};
pub use chart::{parse_cell, Chart};
pub use dice::{DiceSpec, RandomSource, Roll, ScriptedDice, SeededDice};
pub use error::{ChartParseError, TableError};
pub use matchup::{
    DoublesEffect, MatchupBook, MatchupTable, PenaltyBand, SumEntry, TableMeta, TableRates,
};
pub use outcome::{ClockBucket, OutcomeKind, OutcomeRecord, PenaltyCall, Squad};
pub use validation::{ValidationIssue, ValidationReport};
