//! Punts and punt returns.
//!
//! The kick lands `distance` yards past the line of scrimmage. Past the goal
//! line it is a touchback; exactly on the goal line the receiving side
//! chooses between returning and downing; anywhere else the return table is
//! rolled from the landing spot.

use serde::{Deserialize, Serialize};

use playbook::RandomSource;

use crate::decision::PuntReturnChoice;
use crate::resolver::roll_long_gain;

/// Gross punt distance by 2d6 sum (index `sum - 2`).
pub const PUNT_DISTANCE: [u8; 11] = [28, 32, 35, 38, 40, 42, 44, 46, 49, 53, 58];

/// Return-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReturnMark {
    Fumble,
    FairCatch,
    Yards(u8),
    LongGain,
}

/// Return table by 2d6 sum (index `sum - 2`).
const RETURN_TABLE: [ReturnMark; 11] = [
    ReturnMark::Fumble,
    ReturnMark::FairCatch,
    ReturnMark::FairCatch,
    ReturnMark::Yards(2),
    ReturnMark::Yards(4),
    ReturnMark::Yards(6),
    ReturnMark::Yards(8),
    ReturnMark::Yards(10),
    ReturnMark::Yards(13),
    ReturnMark::Yards(18),
    ReturnMark::LongGain,
];

/// Highest 1d6 face on which the kicking side recovers a muffed punt.
const KICKER_RECOVERS_ON: u8 = 3;

/// Where a punt came down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuntLanding {
    /// Through the end zone.
    Touchback,
    /// Exactly on the goal line; the receiver chooses.
    GoalLine,
    /// In the field of play, at this receiving-frame spot.
    Field(u8),
}

impl PuntLanding {
    /// Classifies a landing spot from the kicker's line of scrimmage.
    #[must_use]
    pub fn from_kick(los: u8, distance: u8) -> Self {
        match u16::from(los) + u16::from(distance) {
            landing if landing > 100 => Self::Touchback,
            100 => Self::GoalLine,
            // Below 100, so the narrowing cannot fail.
            landing => Self::Field(100 - u8::try_from(landing).unwrap_or(100)),
        }
    }
}

/// Result of a punt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuntResult {
    /// Gross distance.
    pub distance: u8,
    /// Return yardage.
    pub return_yards: u8,
    /// Fair catch.
    pub fair_catch: bool,
    /// Touchback, including a goal-line ball that was downed.
    pub touchback: bool,
    /// Muffed and recovered by the kicking side.
    pub fumble_turnover: bool,
    /// Returned for a touchdown.
    pub return_touchdown: bool,
    /// Kicking side recovered in the end zone for a touchdown.
    pub kicker_touchdown: bool,
    /// Receiving-frame spot where the next series starts.
    pub yard_line: u8,
}

impl PuntResult {
    fn landed(distance: u8, yard_line: u8) -> Self {
        Self {
            distance,
            return_yards: 0,
            fair_catch: false,
            touchback: false,
            fumble_turnover: false,
            return_touchdown: false,
            kicker_touchdown: false,
            yard_line,
        }
    }

    fn touchback(distance: u8, touchback_spot: u8) -> Self {
        let mut result = Self::landed(distance, touchback_spot);
        result.touchback = true;
        result
    }
}

/// Rolls the gross distance.
pub fn roll_distance(dice: &mut dyn RandomSource) -> u8 {
    let sum = dice.roll_2d6();
    PUNT_DISTANCE[usize::from(sum.clamp(2, 12) - 2)]
}

/// Rolls the return from a receiving-frame spot.
///
/// From the goal line (spot 0) a muff recovered by the kicker is a
/// touchdown, and a fair catch or a receiver recovery is a touchback.
pub fn roll_return(
    dice: &mut dyn RandomSource,
    distance: u8,
    spot: u8,
    touchback_spot: u8,
) -> PuntResult {
    let sum = dice.roll_2d6();
    match RETURN_TABLE[usize::from(sum.clamp(2, 12) - 2)] {
        ReturnMark::Fumble => {
            if dice.roll_die(6) <= KICKER_RECOVERS_ON {
                let mut result = PuntResult::landed(distance, spot);
                if spot == 0 {
                    result.kicker_touchdown = true;
                } else {
                    result.fumble_turnover = true;
                }
                result
            } else if spot == 0 {
                PuntResult::touchback(distance, touchback_spot)
            } else {
                PuntResult::landed(distance, spot)
            }
        }
        ReturnMark::FairCatch => {
            if spot == 0 {
                PuntResult::touchback(distance, touchback_spot)
            } else {
                let mut result = PuntResult::landed(distance, spot);
                result.fair_catch = true;
                result
            }
        }
        ReturnMark::Yards(yards) => returned(distance, spot, yards),
        ReturnMark::LongGain => returned(distance, spot, roll_long_gain(dice)),
    }
}

fn returned(distance: u8, spot: u8, yards: u8) -> PuntResult {
    let end = u16::from(spot) + u16::from(yards);
    let mut result = PuntResult::landed(distance, spot);
    result.return_yards = yards;
    if end >= 100 {
        result.return_touchdown = true;
        result.yard_line = 100;
    } else {
        result.yard_line = spot + yards;
    }
    result
}

/// Finishes a goal-line punt once the receiver has chosen.
pub fn finish_goal_line(
    dice: &mut dyn RandomSource,
    distance: u8,
    choice: PuntReturnChoice,
    touchback_spot: u8,
) -> PuntResult {
    match choice {
        PuntReturnChoice::Down => PuntResult::touchback(distance, touchback_spot),
        PuntReturnChoice::Return => roll_return(dice, distance, 0, touchback_spot),
    }
}

/// Resolves a punt that did not land on the goal line.
pub fn resolve_landing(
    dice: &mut dyn RandomSource,
    distance: u8,
    landing: PuntLanding,
    touchback_spot: u8,
) -> Option<PuntResult> {
    match landing {
        PuntLanding::Touchback => Some(PuntResult::touchback(distance, touchback_spot)),
        PuntLanding::GoalLine => None,
        PuntLanding::Field(spot) => Some(roll_return(dice, distance, spot, touchback_spot)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook::ScriptedDice;

    #[test]
    fn landing_classification() {
        assert_eq!(PuntLanding::from_kick(70, 35), PuntLanding::Touchback);
        assert_eq!(PuntLanding::from_kick(60, 40), PuntLanding::GoalLine);
        assert_eq!(PuntLanding::from_kick(30, 44), PuntLanding::Field(26));
    }

    #[test]
    fn distance_table() {
        assert_eq!(roll_distance(&mut ScriptedDice::new(vec![1, 1])), 28);
        assert_eq!(roll_distance(&mut ScriptedDice::new(vec![3, 4])), 42);
        assert_eq!(roll_distance(&mut ScriptedDice::new(vec![6, 6])), 58);
    }

    #[test]
    fn ordinary_returns() {
        let result = roll_return(&mut ScriptedDice::new(vec![4, 5]), 44, 26, 20);
        assert_eq!(result.return_yards, 10);
        assert_eq!(result.yard_line, 36);

        let result = roll_return(&mut ScriptedDice::new(vec![1, 2]), 44, 26, 20);
        assert!(result.fair_catch);
        assert_eq!(result.yard_line, 26);
    }

    #[test]
    fn muffs_go_either_way() {
        let kicker = roll_return(&mut ScriptedDice::new(vec![1, 1, 2]), 40, 30, 20);
        assert!(kicker.fumble_turnover);
        assert_eq!(kicker.yard_line, 30);

        let receiver = roll_return(&mut ScriptedDice::new(vec![1, 1, 5]), 40, 30, 20);
        assert!(!receiver.fumble_turnover);
        assert_eq!(receiver.yard_line, 30);
    }

    #[test]
    fn long_return_can_score() {
        let result = roll_return(&mut ScriptedDice::new(vec![6, 6, 6]), 40, 12, 20);
        assert!(result.return_touchdown);
        assert_eq!(result.return_yards, 99);
    }

    #[test]
    fn goal_line_choices() {
        let downed = finish_goal_line(&mut ScriptedDice::new(vec![]), 40, PuntReturnChoice::Down, 20);
        assert!(downed.touchback);
        assert_eq!(downed.yard_line, 20);

        let muffed = finish_goal_line(
            &mut ScriptedDice::new(vec![1, 1, 1]),
            40,
            PuntReturnChoice::Return,
            20,
        );
        assert!(muffed.kicker_touchdown);

        let fair = finish_goal_line(
            &mut ScriptedDice::new(vec![2, 2]),
            40,
            PuntReturnChoice::Return,
            20,
        );
        assert!(fair.touchback);

        let short = finish_goal_line(
            &mut ScriptedDice::new(vec![2, 3]),
            40,
            PuntReturnChoice::Return,
            20,
        );
        assert_eq!(short.yard_line, 2);
    }
}
