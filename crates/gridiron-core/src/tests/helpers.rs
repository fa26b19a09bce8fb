//! Builders and fixtures shared by the engine tests.

use std::sync::Arc;

use playbook::data::{standard_catalog, standard_chart, standard_matchups};
use playbook::{CardCatalog, OutcomeKind, OutcomeRecord, RandomSource, ScriptedDice};

use crate::call::PlayCall;
use crate::event::GameEvent;
use crate::game::{Game, GameBuilder};
use crate::resolver::{ChartResolver, DiceTableResolver, PlayResolver};
use crate::state::{GameState, Side};

// =============================================================================
// Fixtures
// =============================================================================

/// The bundled catalog.
pub fn catalog() -> Arc<CardCatalog> {
    Arc::new(standard_catalog().expect("bundled catalog is valid"))
}

/// Chart resolver over the bundled chart.
pub fn chart_resolver() -> Arc<dyn PlayResolver> {
    Arc::new(ChartResolver::new(Arc::new(
        standard_chart().expect("bundled chart is valid"),
    )))
}

/// Dice-table resolver over the bundled book, falling back to the chart.
pub fn dice_resolver() -> Arc<dyn PlayResolver> {
    let book = Arc::new(standard_matchups().expect("bundled book is valid"));
    let chart = ChartResolver::new(Arc::new(standard_chart().expect("bundled chart is valid")));
    Arc::new(DiceTableResolver::new(book).with_fallback(Box::new(chart)))
}

/// Always returns the same outcome, without drawing dice.
pub struct FixedResolver(pub OutcomeKind);

impl PlayResolver for FixedResolver {
    fn name(&self) -> &str {
        "fixed"
    }

    fn resolve(&self, _call: &PlayCall, _dice: &mut dyn RandomSource) -> OutcomeRecord {
        OutcomeRecord::new(self.0.clone())
    }
}

// =============================================================================
// Game setup
// =============================================================================

/// Builder with the bundled catalog and chart resolver.
pub fn chart_builder() -> GameBuilder {
    GameBuilder::new().catalog(catalog()).resolver(chart_resolver())
}

/// A seeded, not yet started chart game.
pub fn seeded_game(seed: u64) -> Game {
    chart_builder().seed(seed).build().expect("valid game")
}

/// A game already in progress at `state`, with scripted dice and a fixed
/// resolver outcome.
pub fn scripted_game(state: GameState, faces: &[u8], outcome: OutcomeKind) -> Game {
    GameBuilder::new()
        .catalog(catalog())
        .resolver(Arc::new(FixedResolver(outcome)))
        .dice(ScriptedDice::new(faces.to_vec()))
        .starting_state(state)
        .build()
        .expect("valid game")
}

/// A first-quarter state with `side` in possession at an offense-frame spot.
pub fn state_at(side: Side, los: u8, down: u8, to_go: u8) -> GameState {
    let mut state = GameState::new(900);
    state.new_series(side, los);
    state.down = down;
    state.to_go = to_go;
    state
}

/// A call built from catalog ids.
pub fn call(offense: &str, defense: &str) -> PlayCall {
    let catalog = catalog();
    PlayCall::new(
        catalog.offense_card(offense).expect("offense card").clone(),
        catalog.defense_card(defense).expect("defense card").clone(),
    )
}

// =============================================================================
// Event checks
// =============================================================================

/// Points each side should have, recomputed from scoring events.
pub fn points_from_events(events: &[GameEvent]) -> (u16, u16) {
    let mut points = [0u16; 2];
    let mut add = |side: Side, n: u16| match side {
        Side::Home => points[0] += n,
        Side::Away => points[1] += n,
    };
    for event in events {
        match event {
            GameEvent::Touchdown { side } => add(*side, 6),
            GameEvent::FieldGoal {
                side, good: true, ..
            } => add(*side, 3),
            GameEvent::Conversion {
                side,
                kind,
                good: true,
            } => add(
                *side,
                match kind {
                    crate::event::ConversionKind::Kick => 1,
                    crate::event::ConversionKind::TwoPoint => 2,
                },
            ),
            GameEvent::Safety { scored_by } => add(*scored_by, 2),
            _ => {}
        }
    }
    (points[0], points[1])
}
