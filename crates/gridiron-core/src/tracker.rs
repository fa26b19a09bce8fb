//! Down, possession and scoring.
//!
//! Every function here is pure: it takes the state before a down plus an
//! already-rolled result and returns a [`Projection`] of the state after it.
//! Nothing draws dice, so a projection can be computed, shown to a player
//! and thrown away without side effects.

use tracing::info;

use playbook::{ClockBucket, OutcomeKind, OutcomeRecord, Squad};

use crate::clock::{ClockCategory, ClockCharge};
use crate::config::EngineConfig;
use crate::event::{ConversionKind, GameEvent, PuntOutcome, TurnoverReason};
use crate::special_teams::place_kick::missed_kick_spot;
use crate::special_teams::{KickoffResult, PlaceKickResult, PuntResult};
use crate::state::{GameFlags, GameState, Side};

/// Offense-frame end line. A catch beyond it cannot be an interception.
const END_LINE: u16 = 110;

/// A kick owed once the current down is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Kickoff by `kicker`. With `choose` the kicker picks normal or onside.
    Kickoff {
        /// Kicking side.
        kicker: Side,
        /// The kicker may choose an onside kick.
        choose: bool,
    },
    /// Free kick after a safety.
    FreeKick {
        /// Side that gave up the safety.
        kicker: Side,
    },
}

/// The state after one down or kick, before the clock runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Resulting state.
    pub state: GameState,
    /// Events in order.
    pub events: Vec<GameEvent>,
    /// Kick owed afterwards.
    pub follow_up: Option<FollowUp>,
    /// Time to charge.
    pub charge: ClockCharge,
    /// An accepted defensive penalty: an expiring half earns an untimed down.
    pub schedules_untimed: bool,
}

impl Projection {
    fn new(pre: &GameState, charge: ClockCharge) -> Self {
        Self {
            state: pre.clone(),
            events: Vec::new(),
            follow_up: None,
            charge,
            schedules_untimed: false,
        }
    }
}

/// Where a yardage change puts the ball.
enum Landing {
    Goal,
    BehindGoal,
    Spot(u8),
}

fn land(los: u8, yards: i16) -> Landing {
    match i16::from(los) + yards {
        spot if spot >= 100 => Landing::Goal,
        spot if spot <= 0 => Landing::BehindGoal,
        spot => Landing::Spot(u8::try_from(spot).unwrap_or_default()),
    }
}

/// Ends the game.
pub fn end_game(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.flags.remove(GameFlags::AWAITING_PAT);
    state.flags.insert(GameFlags::GAME_OVER);
    let winner = state.score.leader();
    info!(score = %state.score, ?winner, "game over");
    events.push(GameEvent::GameOver {
        score: state.score,
        winner,
    });
}

/// Six points for `side`, then the conversion try from the PAT spot.
/// In overtime the touchdown ends the game.
fn touchdown(p: &mut Projection, side: Side, config: &EngineConfig) {
    let state = &mut p.state;
    state.score.add(side, 6);
    info!(%side, score = %state.score, "touchdown");
    p.events.push(GameEvent::Touchdown { side });
    if state.is_overtime() {
        end_game(state, &mut p.events);
        return;
    }
    state.possession = side;
    state.set_los(100 - config.pat_spot);
    state.down = 1;
    state.to_go = config.pat_spot;
    state.flags.insert(GameFlags::AWAITING_PAT);
}

/// Two points for `scored_by`; the other side free-kicks from its 20.
fn safety(p: &mut Projection, scored_by: Side, config: &EngineConfig) {
    let state = &mut p.state;
    state.score.add(scored_by, 2);
    info!(%scored_by, score = %state.score, "safety");
    p.events.push(GameEvent::Safety { scored_by });
    if state.is_overtime() {
        end_game(state, &mut p.events);
        return;
    }
    let kicker = scored_by.opposite();
    state.new_series(kicker, config.free_kick_punt_spot);
    p.follow_up = Some(FollowUp::FreeKick { kicker });
}

fn turnover(p: &mut Projection, reason: TurnoverReason) {
    let from = p.state.possession;
    p.events.push(GameEvent::Turnover {
        from,
        to: from.opposite(),
        reason,
    });
}

/// Next down at the current spot; past fourth down the defense takes over.
fn next_down(p: &mut Projection) {
    if p.state.down >= 4 {
        turnover(p, TurnoverReason::Downs);
        let state = &mut p.state;
        let spot = 100 - state.los();
        state.new_series(state.defense(), spot);
    } else {
        p.state.down += 1;
    }
}

fn gain(p: &mut Projection, yards: i16, config: &EngineConfig) {
    let offense = p.state.possession;
    let los = p.state.los();
    let line_to_gain = los.saturating_add(p.state.to_go);
    match land(los, yards) {
        Landing::Goal => touchdown(p, offense, config),
        Landing::BehindGoal => safety(p, offense.opposite(), config),
        Landing::Spot(spot) => {
            p.state.set_los(spot);
            if yards >= i16::from(p.state.to_go) {
                p.state.first_down();
                p.charge.first_down = true;
                p.events.push(GameEvent::FirstDown { side: offense });
            } else {
                p.state.to_go = line_to_gain.saturating_sub(spot).max(1);
                next_down(p);
            }
        }
    }
}

fn interception(p: &mut Projection, air_yards: u8, return_yards: u8, config: &EngineConfig) {
    let los = p.state.los();
    let catch = u16::from(los) + u16::from(air_yards);
    if catch > END_LINE {
        p.events.push(GameEvent::InterceptionOverruled {
            offense: p.state.possession,
        });
        p.charge.category = ClockCategory::Incomplete;
        next_down(p);
        return;
    }
    turnover(p, TurnoverReason::Interception);
    let defense = p.state.defense();
    // Offense-frame spot where the return ends.
    let spot = i16::try_from(catch).unwrap_or_default() - i16::from(return_yards);
    match spot {
        s if s >= 100 => p.state.new_series(defense, config.touchback_spot),
        s if s <= 0 => touchdown(p, defense, config),
        s => p
            .state
            .new_series(defense, 100 - u8::try_from(s).unwrap_or_default()),
    }
}

fn clock_category(kind: &OutcomeKind, config: &EngineConfig) -> ClockCategory {
    match kind {
        OutcomeKind::Incomplete => ClockCategory::Incomplete,
        OutcomeKind::Interception { .. } => ClockCategory::Interception,
        OutcomeKind::Fumble => ClockCategory::Fumble,
        OutcomeKind::Loss { .. } => ClockCategory::Loss,
        OutcomeKind::Penalty(_) => ClockCategory::Penalty,
        OutcomeKind::LongGain { .. } | OutcomeKind::Touchdown { .. } => {
            ClockCategory::Gain { long: true }
        }
        OutcomeKind::Gain { yards } => ClockCategory::gain(*yards, &config.time_off),
        OutcomeKind::Other => ClockCategory::gain(0, &config.time_off),
    }
}

/// Applies a scrimmage result. A penalty here stands for its declined play.
#[must_use]
pub fn play(pre: &GameState, record: &OutcomeRecord, config: &EngineConfig) -> Projection {
    scrimmage(pre, &record.kind, record.out_of_bounds, record.clock, config)
}

pub(crate) fn scrimmage(
    pre: &GameState,
    kind: &OutcomeKind,
    out_of_bounds: bool,
    bucket: Option<ClockBucket>,
    config: &EngineConfig,
) -> Projection {
    if let OutcomeKind::Penalty(call) = kind {
        return scrimmage(pre, &call.declined_play(), out_of_bounds, bucket, config);
    }
    let mut p = Projection::new(
        pre,
        ClockCharge {
            category: clock_category(kind, config),
            out_of_bounds,
            bucket,
            first_down: false,
        },
    );
    match kind {
        OutcomeKind::Gain { .. } | OutcomeKind::Loss { .. } | OutcomeKind::LongGain { .. } => {
            gain(&mut p, kind.net_yards(), config);
        }
        OutcomeKind::Incomplete => next_down(&mut p),
        OutcomeKind::Fumble => {
            turnover(&mut p, TurnoverReason::Fumble);
            let spot = 100 - p.state.los();
            p.state.new_series(p.state.defense(), spot);
        }
        OutcomeKind::Interception {
            air_yards,
            return_yards,
        } => interception(&mut p, *air_yards, *return_yards, config),
        OutcomeKind::Touchdown { by: Squad::Offense } => {
            touchdown(&mut p, pre.possession, config);
        }
        OutcomeKind::Touchdown { by: Squad::Defense } => {
            turnover(&mut p, TurnoverReason::DefensiveTouchdown);
            touchdown(&mut p, pre.defense(), config);
        }
        OutcomeKind::Other | OutcomeKind::Penalty(_) => gain(&mut p, 0, config),
    }
    p
}

/// Applies a field goal attempt.
#[must_use]
pub fn field_goal(pre: &GameState, kick: &PlaceKickResult, config: &EngineConfig) -> Projection {
    let mut p = Projection::new(pre, ClockCharge::of(ClockCategory::FieldGoal));
    let side = pre.possession;
    p.events.push(GameEvent::FieldGoal {
        side,
        distance: kick.attempted_yards,
        column: kick.column,
        good: kick.success,
    });
    if kick.success {
        p.state.score.add(side, 3);
        info!(%side, distance = kick.attempted_yards, score = %p.state.score, "field goal");
        if p.state.is_overtime() {
            end_game(&mut p.state, &mut p.events);
        } else {
            p.follow_up = Some(FollowUp::Kickoff {
                kicker: side,
                choose: true,
            });
        }
    } else {
        turnover(&mut p, TurnoverReason::MissedFieldGoal);
        let spot = missed_kick_spot(pre.los(), config.touchback_spot);
        p.state.new_series(pre.defense(), spot);
    }
    p
}

/// Whether a two-point play reached the end zone.
#[must_use]
pub fn two_point_good(pre: &GameState, kind: &OutcomeKind) -> bool {
    match kind {
        OutcomeKind::Touchdown { by: Squad::Offense } => true,
        kind if kind.is_turnover() => false,
        kind => kind.net_yards() >= i16::from(pre.yards_to_goal()),
    }
}

/// Scores a conversion try and owes the kickoff.
#[must_use]
pub fn conversion(pre: &GameState, kind: ConversionKind, good: bool) -> Projection {
    let mut p = Projection::new(pre, ClockCharge::of(ClockCategory::ExtraPoint));
    let side = pre.possession;
    p.state.flags.remove(GameFlags::AWAITING_PAT);
    if good {
        let points = match kind {
            ConversionKind::Kick => 1,
            ConversionKind::TwoPoint => 2,
        };
        p.state.score.add(side, points);
    }
    p.events.push(GameEvent::Conversion { side, kind, good });
    p.follow_up = Some(FollowUp::Kickoff {
        kicker: side,
        choose: true,
    });
    p
}

/// Applies a kickoff or free kick.
#[must_use]
pub fn kickoff(
    pre: &GameState,
    kicker: Side,
    kick: &KickoffResult,
    config: &EngineConfig,
) -> Projection {
    let mut p = Projection::new(pre, ClockCharge::of(ClockCategory::Kickoff));
    let receiver = kicker.opposite();
    if kick.touchdown {
        p.events.push(GameEvent::Kickoff {
            kicker,
            kind: kick.kind,
            ball_on: receiver.absolute(100),
            recovered_by_kicker: false,
            touchdown: true,
        });
        touchdown(&mut p, receiver, config);
        return p;
    }
    let (side, frame) = kick.series_start(kicker);
    p.state.new_series(side, frame);
    p.events.push(GameEvent::Kickoff {
        kicker,
        kind: kick.kind,
        ball_on: p.state.ball_on,
        recovered_by_kicker: kick.turnover,
        touchdown: false,
    });
    p
}

/// Applies a punt. `downed` marks a goal-line ball the receiver chose to
/// down.
#[must_use]
pub fn punt(
    pre: &GameState,
    kicker: Side,
    kick: &PuntResult,
    downed: bool,
    config: &EngineConfig,
) -> Projection {
    let mut p = Projection::new(pre, ClockCharge::of(ClockCategory::Punt));
    let receiver = kicker.opposite();
    let outcome = if kick.kicker_touchdown || kick.fumble_turnover {
        PuntOutcome::KickerRecovered
    } else if kick.return_touchdown {
        PuntOutcome::ReturnTouchdown
    } else if downed {
        PuntOutcome::Downed
    } else if kick.touchback {
        PuntOutcome::Touchback
    } else if kick.fair_catch {
        PuntOutcome::FairCatch
    } else {
        PuntOutcome::Returned
    };
    p.events.push(GameEvent::Punt {
        kicker,
        distance: kick.distance,
        return_yards: kick.return_yards,
        outcome,
    });

    if kick.kicker_touchdown {
        touchdown(&mut p, kicker, config);
    } else if kick.return_touchdown {
        touchdown(&mut p, receiver, config);
    } else if kick.fumble_turnover {
        p.events.push(GameEvent::Turnover {
            from: receiver,
            to: kicker,
            reason: TurnoverReason::Fumble,
        });
        p.state.new_series(kicker, 100 - kick.yard_line);
    } else {
        p.state.new_series(receiver, kick.yard_line);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook::PenaltyCall;

    fn at(side: Side, los: u8, down: u8, to_go: u8) -> GameState {
        let mut state = GameState::new(900);
        state.new_series(side, los);
        state.down = down;
        state.to_go = to_go;
        state
    }

    fn run(pre: &GameState, kind: OutcomeKind) -> Projection {
        play(pre, &OutcomeRecord::new(kind), &EngineConfig::default())
    }

    mod yardage_tests {
        use super::*;

        #[test]
        fn short_gain_advances_the_down() {
            let p = run(&at(Side::Home, 30, 1, 10), OutcomeKind::Gain { yards: 4 });
            assert_eq!((p.state.down, p.state.to_go, p.state.ball_on), (2, 6, 34));
            assert!(!p.charge.first_down);
        }

        #[test]
        fn loss_adds_to_the_distance() {
            let p = run(&at(Side::Away, 30, 2, 6), OutcomeKind::Loss { yards: 3 });
            assert_eq!((p.state.down, p.state.to_go), (3, 9));
            assert_eq!(p.state.ball_on, 73);
        }

        #[test]
        fn reaching_the_line_is_a_first_down() {
            let p = run(&at(Side::Home, 40, 3, 5), OutcomeKind::Gain { yards: 5 });
            assert_eq!((p.state.down, p.state.to_go), (1, 10));
            assert!(p.charge.first_down);
            assert_eq!(p.events, vec![GameEvent::FirstDown { side: Side::Home }]);
        }

        #[test]
        fn fourth_down_short_turns_over() {
            let p = run(&at(Side::Home, 60, 4, 3), OutcomeKind::Gain { yards: 1 });
            assert_eq!(p.state.possession, Side::Away);
            assert_eq!(p.state.los(), 39);
            assert_eq!(p.state.down, 1);
        }

        #[test]
        fn crossing_the_goal_is_a_touchdown() {
            let p = run(&at(Side::Away, 95, 1, 5), OutcomeKind::LongGain { yards: 20 });
            assert_eq!(p.state.score.away, 6);
            assert!(p.state.awaiting_pat());
            assert_eq!(p.state.los(), 98);
            assert_eq!(p.state.to_go, 2);
        }

        #[test]
        fn tackled_in_own_end_zone_is_a_safety() {
            let p = run(&at(Side::Home, 2, 2, 10), OutcomeKind::Loss { yards: 5 });
            assert_eq!(p.state.score.away, 2);
            assert_eq!(p.follow_up, Some(FollowUp::FreeKick { kicker: Side::Home }));
            assert_eq!(p.state.los(), 20);
        }
    }

    mod turnover_tests {
        use super::*;

        #[test]
        fn fumble_at_the_line() {
            let p = run(&at(Side::Home, 35, 2, 7), OutcomeKind::Fumble);
            assert_eq!(p.state.possession, Side::Away);
            assert_eq!(p.state.ball_on, 35);
            assert_eq!(p.state.los(), 65);
        }

        #[test]
        fn interception_returned_to_spot() {
            let p = run(
                &at(Side::Home, 40, 1, 10),
                OutcomeKind::Interception {
                    air_yards: 30,
                    return_yards: 12,
                },
            );
            // Caught at the 70, returned to the 58: defense at its own 42.
            assert_eq!(p.state.possession, Side::Away);
            assert_eq!(p.state.los(), 42);
        }

        #[test]
        fn interception_in_end_zone_is_a_touchback() {
            let p = run(
                &at(Side::Home, 90, 1, 10),
                OutcomeKind::Interception {
                    air_yards: 15,
                    return_yards: 0,
                },
            );
            assert_eq!(p.state.possession, Side::Away);
            assert_eq!(p.state.los(), 20);
        }

        #[test]
        fn catch_beyond_end_line_is_incomplete() {
            let pre = at(Side::Home, 85, 2, 10);
            let p = run(
                &pre,
                OutcomeKind::Interception {
                    air_yards: 30,
                    return_yards: 5,
                },
            );
            assert_eq!(p.state.possession, Side::Home);
            assert_eq!(p.state.down, 3);
            assert_eq!(p.state.ball_on, pre.ball_on);
            assert_eq!(p.charge.category, ClockCategory::Incomplete);
        }

        #[test]
        fn pick_six() {
            let p = run(
                &at(Side::Away, 10, 1, 10),
                OutcomeKind::Interception {
                    air_yards: 5,
                    return_yards: 20,
                },
            );
            assert_eq!(p.state.score.home, 6);
            assert_eq!(p.state.possession, Side::Home);
            assert!(p.state.awaiting_pat());
        }

        #[test]
        fn forced_defensive_touchdown() {
            let p = run(
                &at(Side::Home, 50, 1, 10),
                OutcomeKind::Touchdown { by: Squad::Defense },
            );
            assert_eq!(p.state.score.away, 6);
            assert_eq!(p.state.possession, Side::Away);
        }
    }

    mod special_teams_tests {
        use super::*;
        use crate::special_teams::{KickoffKind, PlaceKickColumn};

        #[test]
        fn made_field_goal_owes_a_kickoff() {
            let pre = at(Side::Home, 75, 4, 5);
            let kick = PlaceKickResult {
                attempted_yards: 42,
                column: PlaceKickColumn::Forties,
                sum: 7,
                success: true,
            };
            let p = field_goal(&pre, &kick, &EngineConfig::default());
            assert_eq!(p.state.score.home, 3);
            assert_eq!(
                p.follow_up,
                Some(FollowUp::Kickoff {
                    kicker: Side::Home,
                    choose: true
                })
            );
        }

        #[test]
        fn missed_field_goal_goes_back_to_the_spot() {
            let pre = at(Side::Home, 70, 4, 5);
            let kick = PlaceKickResult {
                attempted_yards: 47,
                column: PlaceKickColumn::Forties,
                sum: 2,
                success: false,
            };
            let p = field_goal(&pre, &kick, &EngineConfig::default());
            assert_eq!(p.state.possession, Side::Away);
            assert_eq!(p.state.los(), 37);
        }

        #[test]
        fn two_point_needs_the_goal_line() {
            let mut pre = at(Side::Home, 98, 1, 2);
            pre.flags.insert(GameFlags::AWAITING_PAT);
            assert!(two_point_good(&pre, &OutcomeKind::Gain { yards: 2 }));
            assert!(!two_point_good(&pre, &OutcomeKind::Gain { yards: 1 }));
            assert!(!two_point_good(&pre, &OutcomeKind::Fumble));

            let p = conversion(&pre, ConversionKind::TwoPoint, true);
            assert_eq!(p.state.score.home, 2);
            assert!(!p.state.awaiting_pat());
        }

        #[test]
        fn kickoff_return_touchdown() {
            let pre = GameState::new(900);
            let kick = KickoffResult {
                kind: KickoffKind::Normal,
                yard_line: 100,
                turnover: false,
                touchdown: true,
                penalty: false,
                offset: false,
            };
            let p = kickoff(&pre, Side::Home, &kick, &EngineConfig::default());
            assert_eq!(p.state.score.away, 6);
            assert!(p.state.awaiting_pat());
        }

        #[test]
        fn muffed_punt_stays_with_the_kicker() {
            let pre = at(Side::Home, 40, 4, 8);
            let kick = PuntResult {
                distance: 40,
                return_yards: 0,
                fair_catch: false,
                touchback: false,
                fumble_turnover: true,
                return_touchdown: false,
                kicker_touchdown: false,
                yard_line: 20,
            };
            let p = punt(&pre, Side::Home, &kick, false, &EngineConfig::default());
            assert_eq!(p.state.possession, Side::Home);
            assert_eq!(p.state.los(), 80);
        }
    }

    #[test]
    fn declined_penalty_stands_as_its_play() {
        let flag = PenaltyCall::new(Squad::Offense, 10).with_play(OutcomeKind::Incomplete);
        let p = run(&at(Side::Home, 30, 2, 10), OutcomeKind::Penalty(flag));
        assert_eq!(p.state.down, 3);
    }

    #[test]
    fn overtime_touchdown_ends_the_game() {
        let mut pre = at(Side::Home, 95, 1, 5);
        pre.quarter = crate::state::OVERTIME_PERIOD;
        let p = run(&pre, OutcomeKind::Gain { yards: 5 });
        assert!(p.state.is_over());
        assert!(!p.state.awaiting_pat());
        assert!(matches!(p.events.last(), Some(GameEvent::GameOver { winner: Some(Side::Home), .. })));
    }
}
