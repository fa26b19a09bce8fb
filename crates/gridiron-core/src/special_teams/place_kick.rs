//! Field goals and conversion kicks.

use serde::{Deserialize, Serialize};
use std::fmt;

use playbook::RandomSource;

/// Yards added to the distance to goal to get the kick distance
/// (end zone plus holder depth).
pub const KICK_DEPTH: u8 = 17;

/// Yards between the line of scrimmage and the spot of the kick.
pub const HOLD_DEPTH: u8 = 7;

/// Distance column of the place-kick table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKickColumn {
    /// Conversion kick.
    Pat,
    /// Under 30 yards.
    Under30,
    /// 30 to 39 yards.
    Thirties,
    /// 40 to 49 yards.
    Forties,
    /// 50 yards and beyond.
    FiftyPlus,
}

impl PlaceKickColumn {
    /// Column for an attempt.
    #[must_use]
    pub const fn for_attempt(distance: u8, conversion: bool) -> Self {
        if conversion {
            return Self::Pat;
        }
        match distance {
            0..=29 => Self::Under30,
            30..=39 => Self::Thirties,
            40..=49 => Self::Forties,
            _ => Self::FiftyPlus,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Pat => 0,
            Self::Under30 => 1,
            Self::Thirties => 2,
            Self::Forties => 3,
            Self::FiftyPlus => 4,
        }
    }
}

impl fmt::Display for PlaceKickColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pat => write!(f, "PAT"),
            Self::Under30 => write!(f, "<30"),
            Self::Thirties => write!(f, "30-39"),
            Self::Forties => write!(f, "40-49"),
            Self::FiftyPlus => write!(f, "50+"),
        }
    }
}

const G: bool = true;
const N: bool = false;

/// Good/no-good grid by 2d6 sum (row `sum - 2`) and column.
const KICK_GRID: [[bool; 5]; 11] = [
    [N, N, N, N, N],
    [G, N, N, N, N],
    [G, G, N, N, N],
    [G, G, G, N, N],
    [G, G, G, G, N],
    [G, G, G, G, G],
    [G, G, G, G, N],
    [G, G, G, G, N],
    [G, G, G, N, N],
    [G, G, N, N, N],
    [G, N, N, N, N],
];

/// Whether a kick in `column` is good on `sum`.
#[must_use]
pub fn is_good(column: PlaceKickColumn, sum: u8) -> bool {
    KICK_GRID[usize::from(sum.clamp(2, 12) - 2)][column.index()]
}

/// Result of a place kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceKickResult {
    /// Kick distance.
    pub attempted_yards: u8,
    /// Table column.
    pub column: PlaceKickColumn,
    /// 2d6 sum rolled.
    pub sum: u8,
    /// Good.
    pub success: bool,
}

/// Kick distance from a given distance to goal.
#[must_use]
pub const fn attempt_distance(yards_to_goal: u8) -> u8 {
    yards_to_goal.saturating_add(KICK_DEPTH)
}

/// Rolls a place kick.
pub fn attempt(dice: &mut dyn RandomSource, yards_to_goal: u8, conversion: bool) -> PlaceKickResult {
    let attempted_yards = attempt_distance(yards_to_goal);
    let column = PlaceKickColumn::for_attempt(attempted_yards, conversion);
    let sum = dice.roll_2d6();
    PlaceKickResult {
        attempted_yards,
        column,
        sum,
        success: is_good(column, sum),
    }
}

/// Where the defense takes over after a miss, in the defense's own frame.
///
/// The ball goes back to the spot of the kick, seven yards behind the line
/// of scrimmage. A spot inside the defense's 20 comes out to the 20.
#[must_use]
pub fn missed_kick_spot(los: u8, touchback_spot: u8) -> u8 {
    let spot_of_kick = los.saturating_sub(HOLD_DEPTH);
    (100 - spot_of_kick).max(touchback_spot)
}
