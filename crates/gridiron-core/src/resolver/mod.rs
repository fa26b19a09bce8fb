//! Play resolvers.
//!
//! A play resolver turns a [`PlayCall`] plus dice into a normalized
//! [`OutcomeRecord`]. Resolvers are read-only over their tables; the game
//! state is never touched here.
//!
//! # Invariants
//!
//! - A resolver never fails. A missing or unusable table entry degrades to
//!   [`OutcomeRecord::neutral`] and logs a warning.
//! - Non-scrimmage calls (punts, place kicks) resolve to the neutral
//!   placeholder without drawing dice; the special-teams sub-engines handle
//!   them.
//! - Long-gain distances are not rolled by the resolver itself; the
//!   orchestrator calls [`resolve_call`], which fills them in afterwards.
//!
//! # Available Resolvers
//!
//! - [`ChartResolver`]: `(deck, play label, defense letter)` chart cells
//! - [`DiceTableResolver`]: 2d20 matchup tables, with an optional fallback
//!   for pairings the book does not cover

mod chart;
mod dice_table;
mod long_gain;

pub use chart::ChartResolver;
pub use dice_table::DiceTableResolver;
pub use long_gain::{fill_long_gain, roll_long_gain, LONG_GAIN_YARDS};

use playbook::{OutcomeRecord, RandomSource};

use crate::call::PlayCall;

/// Maps a play call and dice to an outcome.
///
/// # Example
///
/// ```
/// use gridiron_core::call::PlayCall;
/// use gridiron_core::resolver::PlayResolver;
/// use playbook::{OutcomeKind, OutcomeRecord, RandomSource};
///
/// struct AlwaysFour;
///
/// impl PlayResolver for AlwaysFour {
///     fn name(&self) -> &str {
///         "always-four"
///     }
///
///     fn resolve(&self, _call: &PlayCall, _dice: &mut dyn RandomSource) -> OutcomeRecord {
///         OutcomeRecord::new(OutcomeKind::Gain { yards: 4 })
///     }
/// }
/// ```
pub trait PlayResolver: Send + Sync {
    /// Short name used in logs and summaries.
    fn name(&self) -> &str;

    /// Resolves one call.
    ///
    /// Must draw dice in a fixed order for a given call so that seeded games
    /// replay exactly.
    fn resolve(&self, call: &PlayCall, dice: &mut dyn RandomSource) -> OutcomeRecord;
}

/// Resolves a call and rolls any long-gain distance it left open.
pub fn resolve_call(
    resolver: &dyn PlayResolver,
    call: &PlayCall,
    dice: &mut dyn RandomSource,
) -> OutcomeRecord {
    if !call.category().is_scrimmage() {
        return OutcomeRecord::neutral();
    }
    let mut record = resolver.resolve(call, dice);
    fill_long_gain(&mut record, dice);
    record
}
