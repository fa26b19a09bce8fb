//! Long-gain distance table.
//!
//! Table cells marked "long gain" carry no distance. The distance is rolled
//! on one die when the play is resolved, and punt returns reuse the same
//! table for their breakaway result.

use playbook::{OutcomeKind, OutcomeRecord, RandomSource};

/// Distances by 1d6 face.
pub const LONG_GAIN_YARDS: [u8; 6] = [20, 25, 30, 40, 50, 99];

/// Rolls one long-gain distance.
pub fn roll_long_gain(dice: &mut dyn RandomSource) -> u8 {
    let face = dice.roll_die(6);
    LONG_GAIN_YARDS[usize::from(face.clamp(1, 6) - 1)]
}

/// Fills in the distance of an unrolled long gain, including one that sits
/// under a penalty. Other records are left untouched and consume no dice.
pub fn fill_long_gain(record: &mut OutcomeRecord, dice: &mut dyn RandomSource) {
    match &mut record.kind {
        OutcomeKind::LongGain { yards } if *yards == 0 => *yards = roll_long_gain(dice),
        OutcomeKind::Penalty(call) => {
            if let Some(play) = call.play.as_deref_mut() {
                if let OutcomeKind::LongGain { yards } = play {
                    if *yards == 0 {
                        *yards = roll_long_gain(dice);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook::{PenaltyCall, ScriptedDice, Squad};

    #[test]
    fn faces_map_to_distances() {
        let mut dice = ScriptedDice::new(vec![1, 4, 6]);
        assert_eq!(roll_long_gain(&mut dice), 20);
        assert_eq!(roll_long_gain(&mut dice), 40);
        assert_eq!(roll_long_gain(&mut dice), 99);
    }

    #[test]
    fn fills_plain_and_penalty_long_gains() {
        let mut dice = ScriptedDice::new(vec![2, 5]);
        let mut plain = OutcomeRecord::new(OutcomeKind::LongGain { yards: 0 });
        fill_long_gain(&mut plain, &mut dice);
        assert_eq!(plain.kind, OutcomeKind::LongGain { yards: 25 });

        let mut flagged = OutcomeRecord::new(OutcomeKind::Penalty(
            PenaltyCall::new(Squad::Defense, 15).with_play(OutcomeKind::LongGain { yards: 0 }),
        ));
        fill_long_gain(&mut flagged, &mut dice);
        let OutcomeKind::Penalty(call) = flagged.kind else {
            panic!("expected penalty");
        };
        assert_eq!(call.declined_play(), OutcomeKind::LongGain { yards: 50 });
    }

    #[test]
    fn other_records_consume_no_dice() {
        let mut dice = ScriptedDice::new(vec![3]);
        let mut record = OutcomeRecord::new(OutcomeKind::Gain { yards: 4 });
        fill_long_gain(&mut record, &mut dice);
        assert_eq!(dice.consumed(), 0);
    }
}
