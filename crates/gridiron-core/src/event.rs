//! Structured game events.
//!
//! The engine never emits narration text. Every notable thing that happens
//! during a transaction becomes a [`GameEvent`]; a presentation layer turns
//! them into text or animation. Events of a paused transaction are held back
//! and only published when it commits.

use serde::{Deserialize, Serialize};

use playbook::{OffenseCategory, OutcomeKind};

use crate::special_teams::{KickoffKind, PlaceKickColumn};
use crate::state::{Score, Side};

/// Why possession changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverReason {
    /// Interception.
    Interception,
    /// Lost fumble.
    Fumble,
    /// Fourth down failed.
    Downs,
    /// Missed field goal.
    MissedFieldGoal,
    /// A table result handed the defense a touchdown outright.
    DefensiveTouchdown,
}

/// How a punt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuntOutcome {
    /// Into or through the end zone.
    Touchback,
    /// Fair catch at the landing spot.
    FairCatch,
    /// Returned.
    Returned,
    /// Downed on the goal line by choice.
    Downed,
    /// Muffed and recovered by the kicking side.
    KickerRecovered,
    /// Returned for a touchdown.
    ReturnTouchdown,
}

/// Kind of conversion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    /// One-point kick.
    Kick,
    /// Two-point play from scrimmage.
    TwoPoint,
}

/// Something that happened in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// The opening coin toss.
    CoinToss {
        /// Side receiving the opening kickoff.
        receiver: Side,
    },
    /// A kickoff, onside kick or free kick.
    Kickoff {
        /// Kicking side.
        kicker: Side,
        /// Normal or onside.
        kind: KickoffKind,
        /// Absolute spot where the next series starts.
        ball_on: u8,
        /// The kicking side kept the ball.
        recovered_by_kicker: bool,
        /// Returned for a touchdown.
        touchdown: bool,
    },
    /// A scrimmage play.
    Play {
        /// Side with the ball.
        offense: Side,
        /// Offensive card id.
        offense_card: String,
        /// Defensive card id.
        defense_card: String,
        /// Offensive card category.
        category: OffenseCategory,
        /// The resolved result.
        outcome: OutcomeKind,
        /// Signed yards gained.
        yards: i16,
        /// Out of bounds.
        out_of_bounds: bool,
        /// Raw table text.
        source: String,
    },
    /// A new set of downs.
    FirstDown {
        /// Side with the ball.
        side: Side,
    },
    /// Possession changed hands.
    Turnover {
        /// Side that lost the ball.
        from: Side,
        /// Side that gained it.
        to: Side,
        /// Cause.
        reason: TurnoverReason,
    },
    /// A pass that would have been intercepted beyond the end line.
    InterceptionOverruled {
        /// Passing side, which keeps the ball.
        offense: Side,
    },
    /// A penalty was accepted or declined.
    Penalty {
        /// Penalized side.
        on: Side,
        /// Nominal yardage.
        yards: u8,
        /// Yardage actually enforced.
        enforced: u8,
        /// Accepted by the other side.
        accepted: bool,
        /// Foul name.
        label: Option<String>,
    },
    /// A punt.
    Punt {
        /// Kicking side.
        kicker: Side,
        /// Gross distance.
        distance: u8,
        /// Return yardage.
        return_yards: u8,
        /// How it ended.
        outcome: PuntOutcome,
    },
    /// A field goal attempt.
    FieldGoal {
        /// Kicking side.
        side: Side,
        /// Attempt distance.
        distance: u8,
        /// Table column used.
        column: PlaceKickColumn,
        /// Good or not.
        good: bool,
    },
    /// A conversion try.
    Conversion {
        /// Scoring side.
        side: Side,
        /// Kick or two-point play.
        kind: ConversionKind,
        /// Good or not.
        good: bool,
    },
    /// Six points.
    Touchdown {
        /// Scoring side.
        side: Side,
    },
    /// Two points for the defense.
    Safety {
        /// Scoring side.
        scored_by: Side,
    },
    /// The two-minute warning.
    TwoMinuteWarning {
        /// Quarter.
        quarter: u8,
    },
    /// An untimed down will follow.
    UntimedDownScheduled {
        /// Quarter.
        quarter: u8,
    },
    /// A quarter ended.
    EndOfQuarter {
        /// The quarter that ended.
        quarter: u8,
    },
    /// Halftime.
    Halftime,
    /// Overtime begins.
    Overtime {
        /// Side receiving the overtime kickoff.
        receiver: Side,
    },
    /// Final score.
    GameOver {
        /// Final points.
        score: Score,
        /// Winner, `None` for a tie.
        winner: Option<Side>,
    },
}

impl GameEvent {
    /// Whether the event changes the score.
    #[must_use]
    pub fn is_score(&self) -> bool {
        match self {
            Self::Touchdown { .. } | Self::Safety { .. } => true,
            Self::FieldGoal { good, .. } | Self::Conversion { good, .. } => *good,
            _ => false,
        }
    }
}
