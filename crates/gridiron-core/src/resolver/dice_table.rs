//! 2d20 matchup-table resolver.

use std::sync::Arc;
use tracing::warn;

use playbook::{MatchupBook, OutcomeRecord, RandomSource};

use super::PlayResolver;
use crate::call::PlayCall;

/// Resolves calls by rolling 2d20 against the pairing's matchup table.
///
/// Books rarely cover every pairing. Pairings without a table go to the
/// fallback resolver when one is set (usually a [`ChartResolver`]), and
/// resolve neutral otherwise. The dice are only rolled once a table is found,
/// so a fallback sees the same dice it would have seen on its own.
///
/// [`ChartResolver`]: super::ChartResolver
pub struct DiceTableResolver {
    book: Arc<MatchupBook>,
    fallback: Option<Box<dyn PlayResolver>>,
}

impl DiceTableResolver {
    /// Creates a resolver with no fallback.
    #[must_use]
    pub fn new(book: Arc<MatchupBook>) -> Self {
        Self {
            book,
            fallback: None,
        }
    }

    /// Sets the resolver used for pairings missing from the book.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn PlayResolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// The book in use.
    #[must_use]
    pub fn book(&self) -> &MatchupBook {
        &self.book
    }
}

impl std::fmt::Debug for DiceTableResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiceTableResolver")
            .field("version", &self.book.version())
            .field("fallback", &self.fallback.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

impl PlayResolver for DiceTableResolver {
    fn name(&self) -> &str {
        "dice-table"
    }

    fn resolve(&self, call: &PlayCall, dice: &mut dyn RandomSource) -> OutcomeRecord {
        let offense = call.offense.id.as_str();
        let defense = call.defense.id.as_str();
        let Some(table) = self.book.table(offense, defense) else {
            if let Some(fallback) = &self.fallback {
                return fallback.resolve(call, dice);
            }
            warn!(offense, defense, "no matchup table, using neutral result");
            return OutcomeRecord::neutral();
        };

        let roll = dice.roll_pair(self.book.dice().sides);
        table.lookup(roll, self.book.penalties()).unwrap_or_else(|| {
            warn!(offense, defense, %roll, "no matchup entry, using neutral result");
            OutcomeRecord::neutral()
        })
    }
}
