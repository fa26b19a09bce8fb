//! Engine error types.

use std::path::PathBuf;
use thiserror::Error;

use playbook::TableError;

use crate::decision::DecisionKind;
use crate::state::Side;

/// A call that is illegal in the current situation. Rejected before any
/// state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The card is restricted to other downs.
    #[error("`{card}` cannot be called on down {down}")]
    WrongDown {
        /// Card label.
        card: String,
        /// Current down.
        down: u8,
    },

    /// Goal-line restriction.
    #[error("`{card}` cannot be called {yards_to_goal} yards from the goal")]
    GoalLineRestricted {
        /// Card label.
        card: String,
        /// Current distance to the goal line.
        yards_to_goal: u8,
    },

    /// Field goal attempt beyond the maximum distance.
    #[error("a {distance}-yard field goal exceeds the {max}-yard limit")]
    OutOfRange {
        /// Attempt distance.
        distance: u8,
        /// Configured limit.
        max: u8,
    },

    /// Punt during a conversion try.
    #[error("cannot punt on a conversion try")]
    PuntOnConversion,

    /// The card is not in the acting side's deck.
    #[error("card `{0}` is not in the offense's deck")]
    NotInDeck(String),

    /// The defensive card is not in the catalog.
    #[error("defensive card `{0}` is not in the catalog")]
    UnknownDefense(String),
}

/// Bad engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Field values out of range.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Errors surfaced by the game orchestrator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A game cannot be built without a random source.
    #[error("no random source configured")]
    MissingRandomSource,

    /// A game cannot be built without a play resolver.
    #[error("no play resolver configured")]
    MissingResolver,

    /// A game cannot be built without a card catalog.
    #[error("no card catalog configured")]
    MissingCatalog,

    /// The named deck does not exist in the catalog.
    #[error("unknown deck `{0}`")]
    UnknownDeck(String),

    /// The call is illegal in the current situation.
    #[error("invalid call: {0}")]
    InvalidCall(#[from] CallError),

    /// A down was submitted while a decision is outstanding.
    #[error("a {0} decision is pending")]
    AwaitingDecision(DecisionKind),

    /// A decision was submitted with nothing pending.
    #[error("no decision is pending")]
    NoPendingDecision,

    /// A decision of the wrong kind was submitted.
    #[error("expected a {expected} decision, got {got}")]
    DecisionMismatch {
        /// Kind awaited.
        expected: DecisionKind,
        /// Kind received.
        got: DecisionKind,
    },

    /// The computer found no legal card for a side.
    #[error("no legal call available for {0}")]
    NoLegalCall(Side),

    /// The game has ended.
    #[error("the game is over")]
    GameOver,

    /// A simulated game ran past its down limit.
    #[error("game did not finish within {0} downs")]
    DownLimit(u32),

    /// The opening kickoff has not happened yet.
    #[error("the game has not started")]
    NotStarted,

    /// The game was already started.
    #[error("the game has already started")]
    AlreadyStarted,

    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bad table or catalog.
    #[error(transparent)]
    Table(#[from] TableError),
}
