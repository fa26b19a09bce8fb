//! Kickoffs and onside kicks.
//!
//! Spots are expressed in the receiving frame: 0 is the receiver's own goal
//! line. A kicking-side recovery at receiving-frame spot `s` gives the kicker
//! the ball at `100 - s` in its own frame.

use serde::{Deserialize, Serialize};

use playbook::RandomSource;

use crate::config::EngineConfig;
use crate::state::Side;

/// Normal kickoff or onside kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickoffKind {
    /// Deep kick.
    Normal,
    /// Short kick the kicking side tries to recover.
    Onside,
}

/// Main-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KickMark {
    Spot(u8),
    Fumble,
    Penalty,
    Touchdown,
}

/// Main kickoff table by 2d6 sum (index `sum - 2`).
const MAIN_TABLE: [KickMark; 11] = [
    KickMark::Fumble,
    KickMark::Spot(40),
    KickMark::Spot(15),
    KickMark::Spot(20),
    KickMark::Spot(22),
    KickMark::Spot(25),
    KickMark::Spot(28),
    KickMark::Spot(30),
    KickMark::Spot(35),
    KickMark::Penalty,
    KickMark::Touchdown,
];

/// Reroll column. `None` means the second marker offsets the first.
const REROLL_TABLE: [Option<u8>; 11] = [
    None,
    Some(40),
    Some(15),
    Some(20),
    Some(22),
    Some(25),
    Some(28),
    Some(30),
    Some(35),
    None,
    Some(45),
];

/// Yards a penalty on the receiving side moves the spot back.
const RETURN_PENALTY_YARDS: u8 = 10;

/// Result of one kickoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickoffResult {
    /// Normal or onside.
    pub kind: KickoffKind,
    /// Receiving-frame spot where the next series starts.
    pub yard_line: u8,
    /// The kicking side recovered.
    pub turnover: bool,
    /// Returned for a touchdown.
    pub touchdown: bool,
    /// A penalty on the return was enforced.
    pub penalty: bool,
    /// A second marker offset the first.
    pub offset: bool,
}

impl KickoffResult {
    fn at(kind: KickoffKind, yard_line: u8) -> Self {
        Self {
            kind,
            yard_line,
            turnover: false,
            touchdown: false,
            penalty: false,
            offset: false,
        }
    }

    /// Side that starts the next series, and the spot in its own frame.
    #[must_use]
    pub fn series_start(&self, kicker: Side) -> (Side, u8) {
        if self.turnover {
            (kicker, 100 - self.yard_line)
        } else {
            (kicker.opposite(), self.yard_line)
        }
    }

    /// Moves the receiving spot upfield for a safety free kick.
    #[must_use]
    pub fn with_free_kick_bonus(mut self, bonus: u8, cap: u8) -> Self {
        if !self.touchdown && self.yard_line < cap {
            self.yard_line = self.yard_line.saturating_add(bonus).min(cap);
        }
        self
    }
}

/// Resolves a normal kickoff.
///
/// # Example
///
/// ```
/// use gridiron_core::config::EngineConfig;
/// use gridiron_core::special_teams::kickoff;
/// use playbook::ScriptedDice;
///
/// let mut dice = ScriptedDice::new(vec![3, 4]);
/// let result = kickoff::normal(&mut dice, &EngineConfig::default());
/// assert_eq!(result.yard_line, 25);
/// ```
pub fn normal(dice: &mut dyn RandomSource, config: &EngineConfig) -> KickoffResult {
    let first = dice.roll_2d6();
    let marker = match main_entry(first) {
        KickMark::Spot(spot) => return KickoffResult::at(KickoffKind::Normal, spot),
        KickMark::Touchdown => {
            let mut result = KickoffResult::at(KickoffKind::Normal, 100);
            result.touchdown = true;
            return result;
        }
        marker => marker,
    };

    let second = dice.roll_2d6();
    let Some(spot) = reroll_entry(second) else {
        let mut result = KickoffResult::at(KickoffKind::Normal, config.kickoff_offset_spot);
        result.offset = true;
        return result;
    };
    let mut result = KickoffResult::at(KickoffKind::Normal, spot);
    match marker {
        KickMark::Fumble => result.turnover = true,
        KickMark::Penalty => {
            result.penalty = true;
            result.yard_line = spot - RETURN_PENALTY_YARDS.min(spot / 2);
        }
        KickMark::Spot(_) | KickMark::Touchdown => {}
    }
    result
}

/// Resolves an onside kick. The die gets +1 when the kicking side is not
/// trailing.
pub fn onside(dice: &mut dyn RandomSource, kicker_trailing: bool) -> KickoffResult {
    let roll = dice.roll_die(6) + u8::from(!kicker_trailing);
    // 2-4 and 5-6 share a spot; only the recovering side differs.
    let yard_line = match roll {
        0 | 1 => 60,
        2..=6 => 55,
        _ => 50,
    };
    let mut result = KickoffResult::at(KickoffKind::Onside, yard_line);
    result.turnover = roll >= 5;
    result
}

fn main_entry(sum: u8) -> KickMark {
    MAIN_TABLE[table_index(sum)]
}

fn reroll_entry(sum: u8) -> Option<u8> {
    REROLL_TABLE[table_index(sum)]
}

fn table_index(sum: u8) -> usize {
    usize::from(sum.clamp(2, 12) - 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook::ScriptedDice;

    fn kick(faces: &[u8]) -> KickoffResult {
        normal(&mut ScriptedDice::new(faces.to_vec()), &EngineConfig::default())
    }

    mod normal_tests {
        use super::*;

        #[test]
        fn main_table_spots() {
            assert_eq!(kick(&[3, 4]).yard_line, 25);
            assert_eq!(kick(&[1, 2]).yard_line, 40);
            assert_eq!(kick(&[2, 2]).yard_line, 15);
            assert_eq!(kick(&[5, 5]).yard_line, 35);
        }

        #[test]
        fn twelve_is_a_return_touchdown() {
            let result = kick(&[6, 6]);
            assert!(result.touchdown);
            assert!(!result.turnover);
        }

        #[test]
        fn fumble_marker_gives_kicker_the_reroll_spot() {
            let result = kick(&[1, 1, 4, 4]);
            assert!(result.turnover);
            assert_eq!(result.yard_line, 28);
            assert_eq!(result.series_start(Side::Home), (Side::Home, 72));
        }

        #[test]
        fn penalty_marker_moves_the_receiver_back() {
            let result = kick(&[5, 6, 3, 4]);
            assert!(result.penalty);
            assert_eq!(result.yard_line, 15);

            let deep = kick(&[5, 6, 2, 2]);
            assert_eq!(deep.yard_line, 8);
        }

        #[test]
        fn second_marker_offsets() {
            let result = kick(&[1, 1, 5, 6]);
            assert!(result.offset);
            assert!(!result.turnover);
            assert_eq!(result.yard_line, 25);
        }

        #[test]
        fn reroll_twelve_is_the_45() {
            let result = kick(&[5, 6, 6, 6]);
            assert_eq!(result.yard_line, 35);
            assert!(result.penalty);
        }
    }

    mod onside_tests {
        use super::*;

        #[test]
        fn trailing_kicker_has_no_bonus() {
            let result = onside(&mut ScriptedDice::new(vec![1]), true);
            assert!(!result.turnover);
            assert_eq!(result.series_start(Side::Away), (Side::Home, 60));

            let result = onside(&mut ScriptedDice::new(vec![5]), true);
            assert!(result.turnover);
            assert_eq!(result.series_start(Side::Away), (Side::Away, 45));
        }

        #[test]
        fn bonus_reaches_the_fifty() {
            let result = onside(&mut ScriptedDice::new(vec![6]), false);
            assert!(result.turnover);
            assert_eq!(result.series_start(Side::Home), (Side::Home, 50));

            let result = onside(&mut ScriptedDice::new(vec![4]), false);
            assert!(result.turnover);
        }
    }

    #[test]
    fn free_kick_bonus_is_capped() {
        let result = KickoffResult::at(KickoffKind::Normal, 40).with_free_kick_bonus(15, 50);
        assert_eq!(result.yard_line, 50);
        let result = KickoffResult::at(KickoffKind::Normal, 20).with_free_kick_bonus(15, 50);
        assert_eq!(result.yard_line, 35);
    }
}
