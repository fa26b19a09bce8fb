//! Game clock and period changes.
//!
//! Time is charged once per down from a [`ClockCharge`] describing what the
//! down was. [`run_off`] deducts it and gives the two-minute warning;
//! [`rollover`] handles an expired period.

use serde::{Deserialize, Serialize};
use tracing::info;

use playbook::{ClockBucket, RandomSource};

use crate::config::{EngineConfig, TimeOffTable};
use crate::event::GameEvent;
use crate::state::{GameFlags, GameState, Side, OVERTIME_PERIOD};
use crate::tracker::end_game;

/// What a down was, for timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockCategory {
    /// Incomplete pass.
    Incomplete,
    /// Interception.
    Interception,
    /// Lost fumble.
    Fumble,
    /// Accepted penalty.
    Penalty,
    /// Loss of yardage.
    Loss,
    /// Gain, short or long.
    Gain {
        /// At or beyond the long-gain threshold.
        long: bool,
    },
    /// Kickoff.
    Kickoff,
    /// Punt.
    Punt,
    /// Field goal attempt.
    FieldGoal,
    /// Conversion try.
    ExtraPoint,
}

impl ClockCategory {
    /// Category of a gain of `yards`.
    #[must_use]
    pub fn gain(yards: u8, table: &TimeOffTable) -> Self {
        Self::Gain {
            long: yards >= table.long_gain_yards,
        }
    }
}

/// Everything [`time_off`] needs to know about a down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockCharge {
    /// Category.
    pub category: ClockCategory,
    /// The ball carrier went out of bounds.
    pub out_of_bounds: bool,
    /// Table clock bucket, if the result carried one.
    pub bucket: Option<ClockBucket>,
    /// The down earned a first down.
    pub first_down: bool,
}

impl ClockCharge {
    /// A plain charge for a category.
    #[must_use]
    pub const fn of(category: ClockCategory) -> Self {
        Self {
            category,
            out_of_bounds: false,
            bucket: None,
            first_down: false,
        }
    }
}

/// Seconds a down costs.
///
/// In order: an untimed down is free; after the two-minute warning
/// incompletions, out-of-bounds plays and first downs are free; out of bounds
/// costs its fixed time; a table bucket overrides the category; otherwise the
/// category's time.
#[must_use]
pub fn time_off(charge: &ClockCharge, flags: GameFlags, table: &TimeOffTable) -> u16 {
    if flags.contains(GameFlags::IN_UNTIMED_DOWN) {
        return 0;
    }
    if flags.contains(GameFlags::IN_TWO_MINUTE)
        && (charge.category == ClockCategory::Incomplete
            || charge.out_of_bounds
            || charge.first_down)
    {
        return 0;
    }
    if charge.out_of_bounds {
        return table.out_of_bounds;
    }
    if let Some(bucket) = charge.bucket {
        return bucket.seconds();
    }
    match charge.category {
        ClockCategory::Incomplete => table.incomplete,
        ClockCategory::Interception => table.interception,
        ClockCategory::Fumble => table.fumble,
        ClockCategory::Penalty => table.penalty,
        ClockCategory::Loss => table.loss,
        ClockCategory::Gain { long: false } => table.gain_short,
        ClockCategory::Gain { long: true } => table.gain_long,
        ClockCategory::Kickoff => table.kickoff,
        ClockCategory::Punt => table.punt,
        ClockCategory::FieldGoal => table.field_goal,
        ClockCategory::ExtraPoint => table.extra_point,
    }
}

/// Deducts `seconds` and gives the two-minute warning when the clock first
/// crosses `threshold` in a half-ending quarter. The warning stops the
/// clock at exactly `threshold`.
pub fn run_off(state: &mut GameState, seconds: u16, threshold: u16, events: &mut Vec<GameEvent>) {
    let before = state.clock;
    state.clock = before.saturating_sub(seconds);
    if state.ends_half()
        && !state.flags.contains(GameFlags::TWO_MINUTE_ANNOUNCED)
        && before > threshold
        && state.clock <= threshold
    {
        state.clock = threshold;
        state
            .flags
            .insert(GameFlags::TWO_MINUTE_ANNOUNCED | GameFlags::IN_TWO_MINUTE);
        info!(quarter = state.quarter, "two-minute warning");
        events.push(GameEvent::TwoMinuteWarning {
            quarter: state.quarter,
        });
    }
}

/// Schedules an untimed down when a half expires on a down with an accepted
/// defensive penalty. Returns whether one was scheduled.
pub fn schedule_untimed_down(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.clock > 0
        || !state.ends_half()
        || state.flags.contains(GameFlags::PENDING_UNTIMED_DOWN)
        || state.is_over()
    {
        return false;
    }
    state.flags.insert(GameFlags::PENDING_UNTIMED_DOWN);
    info!(quarter = state.quarter, "untimed down scheduled");
    events.push(GameEvent::UntimedDownScheduled {
        quarter: state.quarter,
    });
    true
}

/// What an expired clock led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// Play continues: time remains, an untimed down is next, or a new
    /// quarter started within the half.
    Continue,
    /// A new half or overtime began; `receiver` gets the kickoff.
    Kickoff {
        /// Receiving side.
        receiver: Side,
    },
    /// The game ended.
    Ended,
}

/// Handles an expired period.
///
/// Nothing happens while time remains, a conversion try is pending, or the
/// game is already over. A finished untimed down is cleared first; a pending
/// one becomes the current down instead of ending the period.
pub fn rollover(
    state: &mut GameState,
    config: &EngineConfig,
    dice: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) -> Rollover {
    if state.clock > 0 || state.awaiting_pat() || state.is_over() {
        return Rollover::Continue;
    }
    state.flags.remove(GameFlags::IN_UNTIMED_DOWN);
    if state.flags.contains(GameFlags::PENDING_UNTIMED_DOWN) {
        state.flags.remove(GameFlags::PENDING_UNTIMED_DOWN);
        state.flags.insert(GameFlags::IN_UNTIMED_DOWN);
        return Rollover::Continue;
    }

    let quarter = state.quarter;
    info!(quarter, score = %state.score, "end of quarter");
    events.push(GameEvent::EndOfQuarter { quarter });
    match quarter {
        1 | 3 => {
            state.quarter += 1;
            state.clock = config.quarter_seconds;
            Rollover::Continue
        }
        2 => {
            state.quarter = 3;
            state.clock = config.quarter_seconds;
            state
                .flags
                .remove(GameFlags::TWO_MINUTE_ANNOUNCED | GameFlags::IN_TWO_MINUTE);
            events.push(GameEvent::Halftime);
            Rollover::Kickoff {
                receiver: state.second_half_receiver,
            }
        }
        4 => {
            state
                .flags
                .remove(GameFlags::TWO_MINUTE_ANNOUNCED | GameFlags::IN_TWO_MINUTE);
            match &config.overtime {
                Some(rules) if state.score.leader().is_none() => {
                    state.quarter = OVERTIME_PERIOD;
                    state.clock = rules.period_seconds;
                    let receiver = if dice.roll_die(2) == 1 {
                        Side::Home
                    } else {
                        Side::Away
                    };
                    info!(%receiver, "overtime");
                    events.push(GameEvent::Overtime { receiver });
                    Rollover::Kickoff { receiver }
                }
                _ => {
                    end_game(state, events);
                    Rollover::Ended
                }
            }
        }
        _ => {
            end_game(state, events);
            Rollover::Ended
        }
    }
}
