//! Play calls and their legality.

use serde::{Deserialize, Serialize};

use playbook::{DefenseCard, OffenseCard, OffenseCategory};

use crate::config::EngineConfig;
use crate::error::CallError;
use crate::special_teams::place_kick::attempt_distance;
use crate::state::GameState;

/// One offensive and one defensive card, called for the same down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCall {
    /// Offensive card.
    pub offense: OffenseCard,
    /// Defensive card.
    pub defense: DefenseCard,
}

impl PlayCall {
    /// Pairs two cards.
    #[must_use]
    pub fn new(offense: OffenseCard, defense: DefenseCard) -> Self {
        Self { offense, defense }
    }

    /// Offensive category.
    #[must_use]
    pub fn category(&self) -> OffenseCategory {
        self.offense.category
    }

    /// Checks the call against the situation.
    ///
    /// # Errors
    ///
    /// The first [`CallError`] that applies; see [`check_offense`].
    pub fn validate(&self, state: &GameState, config: &EngineConfig) -> Result<(), CallError> {
        check_offense(&self.offense, state, config)
    }
}

/// Checks whether an offensive card may be called.
///
/// A conversion try is not a down, so down restrictions do not apply to it;
/// goal-line restrictions still do.
///
/// # Errors
///
/// The first [`CallError`] that applies.
pub fn check_offense(
    card: &OffenseCard,
    state: &GameState,
    config: &EngineConfig,
) -> Result<(), CallError> {
    let yards_to_goal = state.yards_to_goal();
    let conversion = state.awaiting_pat();

    if conversion && card.category == OffenseCategory::Punt {
        return Err(CallError::PuntOnConversion);
    }
    if !conversion && !card.allowed_on_down(state.down) {
        return Err(CallError::WrongDown {
            card: card.label.clone(),
            down: state.down,
        });
    }
    if card.blocked_at(yards_to_goal) {
        return Err(CallError::GoalLineRestricted {
            card: card.label.clone(),
            yards_to_goal,
        });
    }
    if !conversion && card.category == OffenseCategory::FieldGoal {
        let distance = attempt_distance(yards_to_goal);
        if distance > config.max_field_goal {
            return Err(CallError::OutOfRange {
                distance,
                max: config.max_field_goal,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Side;
    use playbook::data::standard_catalog;

    fn call(offense: &str) -> PlayCall {
        let catalog = standard_catalog().unwrap();
        PlayCall::new(
            catalog.offense_card(offense).unwrap().clone(),
            catalog.defense_card("def-43-base").unwrap().clone(),
        )
    }

    fn state_at(down: u8, los: u8) -> GameState {
        let mut state = GameState::new(900);
        state.new_series(Side::Home, los);
        state.down = down;
        state
    }

    #[test]
    fn punt_only_on_fourth() {
        let config = EngineConfig::default();
        assert!(call("pro-punt").validate(&state_at(4, 30), &config).is_ok());
        assert_eq!(
            call("pro-punt").validate(&state_at(2, 30), &config),
            Err(CallError::WrongDown {
                card: "Punt".to_string(),
                down: 2
            })
        );
        assert!(call("pro-quick-kick").validate(&state_at(3, 30), &config).is_ok());
    }

    #[test]
    fn goal_line_restriction() {
        let config = EngineConfig::default();
        assert!(matches!(
            call("pro-reverse").validate(&state_at(1, 90), &config),
            Err(CallError::GoalLineRestricted { yards_to_goal: 10, .. })
        ));
        assert!(call("pro-reverse").validate(&state_at(1, 89), &config).is_ok());
    }

    #[test]
    fn field_goal_range() {
        let config = EngineConfig::default();
        assert!(call("pro-field-goal").validate(&state_at(4, 62), &config).is_ok());
        assert_eq!(
            call("pro-field-goal").validate(&state_at(4, 61), &config),
            Err(CallError::OutOfRange { distance: 56, max: 55 })
        );
    }

    #[test]
    fn conversion_rules() {
        let config = EngineConfig::default();
        let mut state = state_at(1, 98);
        state.flags.insert(crate::state::GameFlags::AWAITING_PAT);
        assert_eq!(
            call("pro-punt").validate(&state, &config),
            Err(CallError::PuntOnConversion)
        );
        assert!(call("pro-field-goal").validate(&state, &config).is_ok());
        assert!(call("pro-short-pass").validate(&state, &config).is_ok());
        assert!(call("pro-screen").validate(&state, &config).is_err());
    }
}
