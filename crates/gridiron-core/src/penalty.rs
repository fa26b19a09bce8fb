//! Penalty adjudication.
//!
//! A flagged down yields two projections computed from the same pre-snap
//! state: [`accept`] enforces the foul from the previous line of scrimmage,
//! [`decline`] lets the play stand. The side that was not penalized picks
//! one.
//!
//! # Enforcement
//!
//! - Offensive fouls move the ball back toward the offense's goal; the down
//!   is replayed with the added distance.
//! - Defensive fouls move the ball forward. Reaching the line to gain, or a
//!   foul carrying an automatic first down, earns a first down.
//! - No enforcement covers more than half the distance to the goal line it
//!   moves toward.
//! - A foul on a long gain is enforced from midfield when the line of
//!   scrimmage is short of it.

use playbook::{OutcomeRecord, PenaltyCall, Squad};

use crate::clock::{ClockCategory, ClockCharge};
use crate::config::EngineConfig;
use crate::event::GameEvent;
use crate::state::{GameState, Side};
use crate::tracker::{self, Projection};

/// Line of scrimmage a long-gain foul is enforced from, at the least.
const MIDFIELD: u8 = 50;

/// Yards actually enforced: the nominal yardage, capped at half the
/// distance to the goal line.
///
/// ```
/// use gridiron_core::penalty::half_distance;
///
/// assert_eq!(half_distance(15, 40), 15);
/// assert_eq!(half_distance(15, 12), 6);
/// ```
#[must_use]
pub const fn half_distance(yards: u8, distance_to_goal: u8) -> u8 {
    let cap = distance_to_goal / 2;
    if yards < cap {
        yards
    } else {
        cap
    }
}

/// The side that accepts or declines.
#[must_use]
pub fn decider(pre: &GameState, call: &PenaltyCall) -> Side {
    match call.on {
        Squad::Offense => pre.defense(),
        Squad::Defense => pre.possession,
    }
}

fn penalized(pre: &GameState, call: &PenaltyCall) -> Side {
    decider(pre, call).opposite()
}

/// Projection with the penalty enforced.
#[must_use]
pub fn accept(pre: &GameState, call: &PenaltyCall, record: &OutcomeRecord) -> Projection {
    let mut state = pre.clone();
    let los = pre.los();
    let mut first_down = false;
    let enforced = match call.on {
        Squad::Offense => {
            let applied = half_distance(call.yards, los);
            state.set_los(los - applied);
            state.to_go = state.to_go.saturating_add(applied);
            applied
        }
        Squad::Defense => {
            let base = if call.on_long_gain() { los.max(MIDFIELD) } else { los };
            let applied = half_distance(call.yards, 100 - base);
            let spot = base + applied;
            let line_to_gain = los.saturating_add(pre.to_go);
            state.set_los(spot);
            if call.automatic_first_down || spot >= line_to_gain {
                state.first_down();
                first_down = true;
            } else {
                state.to_go = line_to_gain - spot;
            }
            applied
        }
    };

    let mut events = vec![GameEvent::Penalty {
        on: penalized(pre, call),
        yards: call.yards,
        enforced,
        accepted: true,
        label: call.label.clone(),
    }];
    if first_down {
        events.push(GameEvent::FirstDown {
            side: pre.possession,
        });
    }
    Projection {
        state,
        events,
        follow_up: None,
        charge: ClockCharge {
            category: ClockCategory::Penalty,
            out_of_bounds: false,
            bucket: record.clock,
            first_down,
        },
        schedules_untimed: call.on == Squad::Defense,
    }
}

/// Projection with the play result standing.
#[must_use]
pub fn decline(
    pre: &GameState,
    call: &PenaltyCall,
    record: &OutcomeRecord,
    config: &EngineConfig,
) -> Projection {
    let mut projection = tracker::scrimmage(
        pre,
        &call.declined_play(),
        record.out_of_bounds,
        record.clock,
        config,
    );
    projection.events.insert(
        0,
        GameEvent::Penalty {
            on: penalized(pre, call),
            yards: call.yards,
            enforced: 0,
            accepted: false,
            label: call.label.clone(),
        },
    );
    projection
}

/// How much `side` likes a state, in rough points.
///
/// Score margin plus the value of field position: a ball deep in the
/// opponent's end is worth close to a touchdown, one deep in the own end a
/// little less than nothing, and later downs and longer distances shave
/// some off. Fourth down costs a heavy extra amount that grows with the
/// distance, since the series is nearly spent. A pending conversion is
/// worth about one point to the scorer.
#[must_use]
pub fn utility(state: &GameState, side: Side) -> f64 {
    let margin = f64::from(state.score.margin(side));
    if state.is_over() {
        return margin;
    }
    let field = if state.awaiting_pat() {
        1.0
    } else {
        -0.5 + 0.065 * f64::from(state.los())
            - 0.35 * f64::from(state.down.saturating_sub(1))
            - 0.04 * f64::from(state.to_go)
            - fourth_down_cost(state)
    };
    if state.possession == side {
        margin + field
    } else {
        margin - field
    }
}

const FOURTH_DOWN_COST: f64 = 1.5;
const FOURTH_DOWN_PER_YARD: f64 = 0.1;

fn fourth_down_cost(state: &GameState) -> f64 {
    if state.down < 4 {
        return 0.0;
    }
    FOURTH_DOWN_COST + FOURTH_DOWN_PER_YARD * f64::from(state.to_go)
}

/// Whether `decider` accepts. Ties decline.
#[must_use]
pub fn prefers_accept(accept: &GameState, decline: &GameState, decider: Side) -> bool {
    utility(accept, decider) > utility(decline, decider)
}
