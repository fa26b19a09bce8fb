//! Fixed-dice situations with known answers.

use playbook::{OutcomeKind, PenaltyCall, ScriptedDice, Squad};

use crate::event::{ConversionKind, GameEvent, TurnoverReason};
use crate::game::Progress;
use crate::state::{GameFlags, Side};

use super::helpers::{call, chart_builder, scripted_game, state_at};

#[test]
fn kickoff_roll_of_seven_starts_at_the_25() {
    // d2 = 2: Away receives. 3 + 4 = 7 on the kickoff table.
    let mut game = chart_builder()
        .dice(ScriptedDice::new(vec![2, 3, 4]))
        .build()
        .unwrap();
    assert_eq!(game.start().unwrap(), Progress::Resolved);

    let state = game.state();
    assert_eq!(state.possession, Side::Away);
    assert_eq!(state.los(), 25);
    assert_eq!(state.ball_on, 75);
    assert!(game.events().iter().any(|e| matches!(
        e,
        GameEvent::Kickoff {
            kicker: Side::Home,
            ball_on: 75,
            ..
        }
    )));
}

#[test]
fn extra_point_on_eight_is_good() {
    let mut state = state_at(Side::Home, 98, 1, 2);
    state.flags.insert(GameFlags::AWAITING_PAT);
    state.score.home = 6;
    let mut game = scripted_game(state, &[4, 4], OutcomeKind::Incomplete);

    let progress = game
        .resolve_down(&call("pro-field-goal", "def-43-base"))
        .unwrap();
    assert_eq!(progress, Progress::Resolved);
    assert_eq!(game.state().score.home, 7);
    assert!(!game.state().awaiting_pat());
    assert!(game.events().iter().any(|e| matches!(
        e,
        GameEvent::Conversion {
            side: Side::Home,
            kind: ConversionKind::Kick,
            good: true
        }
    )));
}

#[test]
fn fourth_and_one_plunge_into_goal_line_defense() {
    let mut game = chart_builder()
        .dice(ScriptedDice::new(vec![1]))
        .starting_state(state_at(Side::Home, 40, 4, 1))
        .build()
        .unwrap();
    assert_eq!(
        game.resolve_down(&call("pro-line-plunge", "def-goal-line")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.possession, Side::Home);
    assert_eq!((state.los(), state.down, state.to_go), (41, 1, 10));
}

#[test]
fn fourth_and_two_plunge_is_short() {
    let mut game = chart_builder()
        .dice(ScriptedDice::new(vec![1]))
        .starting_state(state_at(Side::Home, 40, 4, 2))
        .build()
        .unwrap();
    assert_eq!(
        game.resolve_down(&call("pro-line-plunge", "def-goal-line")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.possession, Side::Away);
    assert_eq!(state.ball_on, 41);
    assert_eq!(state.down, 1);
    assert!(game.events().iter().any(|e| matches!(
        e,
        GameEvent::Turnover {
            reason: TurnoverReason::Downs,
            ..
        }
    )));
}

#[test]
fn accepted_automatic_first_down_resets_the_series() {
    let foul = PenaltyCall::new(Squad::Defense, 15).with_automatic_first_down();
    let mut game = scripted_game(
        state_at(Side::Home, 40, 3, 17),
        &[1],
        OutcomeKind::Penalty(foul),
    );
    assert_eq!(
        game.resolve_down(&call("pro-off-tackle", "def-43-base")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!((state.los(), state.down, state.to_go), (55, 1, 10));
    assert_eq!(state.clock, 890);
    assert!(game.events().iter().any(|e| matches!(
        e,
        GameEvent::Penalty {
            on: Side::Away,
            enforced: 15,
            accepted: true,
            ..
        }
    )));
    assert_eq!(game.stats().away.penalty_yards, 15);
}

#[test]
fn offensive_foul_on_third_down_incompletion_is_declined() {
    let foul = PenaltyCall::new(Squad::Offense, 10).with_play(OutcomeKind::Incomplete);
    let mut game = scripted_game(
        state_at(Side::Home, 30, 3, 10),
        &[1],
        OutcomeKind::Penalty(foul),
    );
    assert_eq!(
        game.resolve_down(&call("pro-short-pass", "def-43-base")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.possession, Side::Home);
    assert_eq!((state.los(), state.down, state.to_go), (30, 4, 10));
    assert!(game.events().iter().any(|e| matches!(
        e,
        GameEvent::Penalty {
            on: Side::Home,
            accepted: false,
            ..
        }
    )));
    assert_eq!(game.stats().home.penalties, 0);
}

#[test]
fn interception_beyond_the_end_line_is_incomplete() {
    let mut game = scripted_game(
        state_at(Side::Home, 70, 2, 10),
        &[1],
        OutcomeKind::Interception {
            air_yards: 45,
            return_yards: 0,
        },
    );
    assert_eq!(
        game.resolve_down(&call("pro-long-pass", "def-prevent")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.possession, Side::Home);
    assert_eq!((state.los(), state.down, state.to_go), (70, 3, 10));
    assert_eq!(state.clock, 890);
    assert!(game
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::InterceptionOverruled { offense: Side::Home })));
    assert_eq!(game.stats().home.turnovers, 0);
}

#[test]
fn two_minute_warning_stops_the_clock() {
    let mut state = state_at(Side::Home, 30, 1, 10);
    state.quarter = 2;
    state.clock = 130;
    let mut game = scripted_game(state, &[1], OutcomeKind::Gain { yards: 4 });
    assert_eq!(
        game.resolve_down(&call("pro-draw", "def-nickel")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.clock, 120);
    assert!(state.flags.contains(GameFlags::IN_TWO_MINUTE));
    assert!(game
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::TwoMinuteWarning { quarter: 2 })));
}

#[test]
fn defensive_foul_at_the_gun_earns_an_untimed_down() {
    let mut state = state_at(Side::Home, 40, 2, 10);
    state.quarter = 2;
    state.clock = 5;
    let foul = PenaltyCall::new(Squad::Defense, 5);
    let mut game = scripted_game(state, &[1], OutcomeKind::Penalty(foul));
    assert_eq!(
        game.resolve_down(&call("pro-off-tackle", "def-43-base")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!((state.quarter, state.clock), (2, 0));
    assert!(state.flags.contains(GameFlags::IN_UNTIMED_DOWN));
    assert_eq!((state.los(), state.down, state.to_go), (45, 2, 5));
}

#[test]
fn expiring_half_without_a_foul_goes_to_halftime() {
    let mut state = state_at(Side::Home, 40, 2, 10);
    state.quarter = 2;
    state.clock = 5;
    state.second_half_receiver = Side::Away;
    // Gain, then the second-half kickoff: 3 + 4 = 7.
    let mut game = scripted_game(state, &[3, 4], OutcomeKind::Gain { yards: 3 });
    assert_eq!(
        game.resolve_down(&call("pro-off-tackle", "def-43-base")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.quarter, 3);
    assert_eq!(state.possession, Side::Away);
    assert_eq!(state.los(), 25);
    assert!(game.events().iter().any(|e| matches!(e, GameEvent::Halftime)));
}

#[test]
fn safety_then_free_kick() {
    // Kickoff 3 + 4 = 7 lands at the 25, moved up 15 for the free kick.
    let mut game = scripted_game(
        state_at(Side::Home, 2, 2, 8),
        &[3, 4],
        OutcomeKind::Loss { yards: 5 },
    );
    assert_eq!(
        game.resolve_down(&call("pro-off-tackle", "def-run-blitz")).unwrap(),
        Progress::Resolved
    );

    let state = game.state();
    assert_eq!(state.score.away, 2);
    assert_eq!(state.possession, Side::Away);
    assert_eq!(state.los(), 40);
    assert_eq!(state.clock, 900 - 30 - 10);
    assert!(game
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::Safety { scored_by: Side::Away })));
}
