//! Situational play calling and decisions for computer-controlled sides.
//!
//! Every threshold comes from [`AiThresholds`]; the [`CoachProfile`] only
//! biases the result. Card choice among equally suitable cards is uniform
//! through the game's dice, so seeded games stay reproducible.

use playbook::{CardCatalog, DefenseCard, DefenseCategory, Deck, OffenseCard, OffenseCategory, RandomSource};

use super::CoachProfile;
use crate::call::check_offense;
use crate::config::{AiThresholds, EngineConfig};
use crate::decision::{
    Decision, DecisionKind, DecisionRequest, FreeKickChoice, PenaltyChoice, PuntReturnChoice,
};
use crate::penalty;
use crate::special_teams::place_kick::attempt_distance;
use crate::special_teams::KickoffKind;
use crate::state::{GameState, Side};

/// Yards to goal inside which the defense expects a run.
const GOAL_LINE_YARDS: u8 = 3;

/// What to do on fourth down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourthDownPlan {
    /// Kick a field goal.
    FieldGoal,
    /// Run a scrimmage play.
    GoForIt,
    /// Punt.
    Punt,
}

fn is_late(state: &GameState, ai: &AiThresholds) -> bool {
    state.quarter >= 4 && state.clock <= ai.late_game_seconds
}

/// Probability that the offense throws.
#[must_use]
pub fn pass_probability(state: &GameState, profile: &CoachProfile, ai: &AiThresholds) -> f64 {
    let mut p = match state.to_go {
        8.. => 0.65,
        4..=7 => 0.5,
        _ => 0.3,
    };
    if state.down == 3 && state.to_go >= 4 {
        p += 0.15;
    }
    if state.down == 1 {
        p -= 0.05;
    }
    if state.yards_to_goal() <= ai.red_zone {
        p -= 0.1;
    }
    if is_late(state, ai) {
        match state.score.margin(state.possession) {
            m if m < 0 => p += 0.25,
            m if m > 0 => p -= 0.25,
            _ => {}
        }
    }
    p += (profile.pass_bias - 0.5) * 0.4;
    p.clamp(0.05, 0.95)
}

/// Weighted go-for-it score. Positive means go.
#[must_use]
pub fn fourth_down_score(state: &GameState, profile: &CoachProfile, ai: &AiThresholds) -> f64 {
    let w = &ai.fourth_down;
    let mut score = w.base + w.per_yard * f64::from(state.to_go);
    if state.to_go <= 2 {
        score += w.short_yardage;
    }
    score += w.boldness * (profile.fourth_down_boldness - 0.5);
    if is_late(state, ai) && state.score.margin(state.possession) < 0 {
        score += w.trailing_late;
    }
    if state.los() > 50 {
        score += w.opponent_territory;
    }
    score
}

/// Picks the fourth-down branch.
///
/// A field goal in range is kicked unless it cannot help late in the game
/// or it is fourth and one and the coach wants to go. Outside range the
/// coach goes for it on a positive score, and never punts from close in or,
/// when aggressive enough, from around midfield.
#[must_use]
pub fn fourth_down_plan(state: &GameState, profile: &CoachProfile, config: &EngineConfig) -> FourthDownPlan {
    let ai = &config.ai;
    let go = fourth_down_score(state, profile, ai) > 0.0;
    let in_range =
        attempt_distance(state.yards_to_goal()) <= ai.fg_max_attempt.min(config.max_field_goal);
    let kick_useless = is_late(state, ai) && state.score.margin(state.possession) < -3;
    if in_range && !kick_useless && !(go && state.to_go <= 1) {
        return FourthDownPlan::FieldGoal;
    }
    let punt_suppressed = state.yards_to_goal() <= ai.punt_suppress_inside
        || (profile.aggression >= ai.aggressive_midfield && (45..=55).contains(&state.los()));
    if go || punt_suppressed || kick_useless {
        FourthDownPlan::GoForIt
    } else {
        FourthDownPlan::Punt
    }
}

/// Whether to try for two after a touchdown.
#[must_use]
pub fn go_for_two(state: &GameState, profile: &CoachProfile, ai: &AiThresholds) -> bool {
    let window = if profile.two_point_aggression >= 0.75 {
        state.quarter >= 3
    } else {
        is_late(state, ai)
    };
    window
        && profile.two_point_aggression >= 0.25
        && ai
            .two_point_margins
            .contains(&state.score.margin(state.possession))
}

fn pick_card<'a>(
    deck: &'a Deck,
    category: OffenseCategory,
    state: &GameState,
    config: &EngineConfig,
    dice: &mut dyn RandomSource,
) -> Option<&'a OffenseCard> {
    let cards: Vec<&OffenseCard> = deck
        .cards_in(category)
        .filter(|card| check_offense(card, state, config).is_ok())
        .collect();
    cards.get(dice.pick(cards.len())).copied()
}

fn scrimmage_card<'a>(
    state: &GameState,
    deck: &'a Deck,
    profile: &CoachProfile,
    config: &EngineConfig,
    dice: &mut dyn RandomSource,
) -> Option<&'a OffenseCard> {
    let (first, second) = if dice.chance(pass_probability(state, profile, &config.ai)) {
        (OffenseCategory::Pass, OffenseCategory::Run)
    } else {
        (OffenseCategory::Run, OffenseCategory::Pass)
    };
    pick_card(deck, first, state, config, dice).or_else(|| pick_card(deck, second, state, config, dice))
}

/// Picks the offensive card. `None` when nothing in the deck is legal.
pub fn choose_offense(
    state: &GameState,
    deck: &Deck,
    profile: &CoachProfile,
    config: &EngineConfig,
    dice: &mut dyn RandomSource,
) -> Option<OffenseCard> {
    let planned = if state.awaiting_pat() {
        if go_for_two(state, profile, &config.ai) {
            None
        } else {
            pick_card(deck, OffenseCategory::FieldGoal, state, config, dice)
        }
    } else if state.down == 4 {
        match fourth_down_plan(state, profile, config) {
            FourthDownPlan::FieldGoal => pick_card(deck, OffenseCategory::FieldGoal, state, config, dice),
            FourthDownPlan::Punt => pick_card(deck, OffenseCategory::Punt, state, config, dice),
            FourthDownPlan::GoForIt => None,
        }
    } else {
        None
    };
    planned
        .or_else(|| scrimmage_card(state, deck, profile, config, dice))
        .cloned()
}

/// Picks the defensive card.
///
/// With probability `defense_read_rate` the defense reads the situation:
/// run defense near the goal line or when a run is likely, pass defense when
/// a pass is likely, balanced otherwise. Otherwise it guesses among all
/// cards.
pub fn choose_defense(
    state: &GameState,
    catalog: &CardCatalog,
    ai: &AiThresholds,
    dice: &mut dyn RandomSource,
) -> Option<DefenseCard> {
    let read = if dice.chance(ai.defense_read_rate) {
        let expected = pass_probability(state, &CoachProfile::balanced(), ai);
        Some(if state.yards_to_goal() <= GOAL_LINE_YARDS || expected <= 0.4 {
            DefenseCategory::Run
        } else if expected >= 0.6 {
            DefenseCategory::Pass
        } else {
            DefenseCategory::Balanced
        })
    } else {
        None
    };
    let mut cards: Vec<&DefenseCard> = match read {
        Some(category) => catalog.defense_in(category).collect(),
        None => Vec::new(),
    };
    if cards.is_empty() {
        cards = catalog.defense.iter().collect();
    }
    cards.get(dice.pick(cards.len())).copied().cloned()
}

/// Normal or onside kickoff.
#[must_use]
pub fn choose_kickoff(state: &GameState, kicker: Side, profile: &CoachProfile, ai: &AiThresholds) -> KickoffKind {
    let deficit = -state.score.margin(kicker);
    let window = state.quarter >= 4 && state.clock <= ai.onside_seconds;
    let in_band = (i32::from(ai.onside_min_deficit)..=i32::from(ai.onside_max_deficit)).contains(&deficit);
    if window && (in_band || (deficit > 0 && profile.onside_aggression >= 0.9)) {
        KickoffKind::Onside
    } else {
        KickoffKind::Normal
    }
}

/// Goal-line punt: return only when trailing late.
#[must_use]
pub fn choose_punt_return(state: &GameState, receiver: Side, ai: &AiThresholds) -> PuntReturnChoice {
    if is_late(state, ai) && state.score.margin(receiver) < 0 {
        PuntReturnChoice::Return
    } else {
        PuntReturnChoice::Down
    }
}

/// Answers any pending request.
#[must_use]
pub fn decide(
    request: &DecisionRequest,
    state: &GameState,
    profile: &CoachProfile,
    ai: &AiThresholds,
) -> Decision {
    match request.kind {
        DecisionKind::Penalty => {
            let accept = request.preview(Decision::Penalty(PenaltyChoice::Accept));
            let decline = request.preview(Decision::Penalty(PenaltyChoice::Decline));
            let choice = match (accept, decline) {
                (Some(a), Some(d)) if penalty::prefers_accept(a, d, request.decider) => {
                    PenaltyChoice::Accept
                }
                _ => PenaltyChoice::Decline,
            };
            Decision::Penalty(choice)
        }
        DecisionKind::PuntReturn => {
            Decision::PuntReturn(choose_punt_return(state, request.decider, ai))
        }
        DecisionKind::KickoffType => {
            Decision::KickoffType(choose_kickoff(state, request.decider, profile, ai))
        }
        DecisionKind::FreeKick => Decision::FreeKick(FreeKickChoice::Kickoff),
    }
}
