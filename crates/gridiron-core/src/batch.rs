//! Seeded batch simulation.
//!
//! Runs many computer-vs-computer games in parallel. Every game gets its own
//! [`SeededDice`](playbook::SeededDice) and its own [`Game`](crate::game::Game);
//! only the read-only tables are shared. Results are aggregated after all
//! games have finished, in seed order, so a batch is reproducible regardless
//! of scheduling.
//!
//! When a [`MatchupBook`] is supplied, per-pairing turnover rate and yards
//! per play are checked against the bounds declared in each table's
//! metadata once a pairing has been seen often enough.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use playbook::{CardCatalog, MatchupBook};

use crate::ai::CoachProfile;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::GameEvent;
use crate::game::{Controller, GameBuilder};
use crate::resolver::PlayResolver;
use crate::state::{Score, Side};
use crate::stats::GameStats;

/// Plays a pairing needs before its bounds are checked.
pub const MIN_PAIRING_PLAYS: u32 = 200;

/// Default per-game down limit.
pub const DEFAULT_MAX_DOWNS: u32 = 2_000;

/// Everything needed to build identical games.
#[derive(Clone)]
pub struct GameSetup {
    /// Rule constants.
    pub config: EngineConfig,
    /// Card catalog.
    pub catalog: Arc<CardCatalog>,
    /// Play resolver.
    pub resolver: Arc<dyn PlayResolver>,
    /// Matchup tables whose declared bounds are checked.
    pub book: Option<Arc<MatchupBook>>,
    /// Deck names, Home then Away. `None` takes the catalog's first deck.
    pub decks: [Option<String>; 2],
    /// Coach profiles, Home then Away.
    pub profiles: [CoachProfile; 2],
    /// Downs after which a game is abandoned as an error.
    pub max_downs: u32,
}

impl fmt::Debug for GameSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSetup")
            .field("resolver", &self.resolver.name())
            .field("book", &self.book.as_ref().map(|b| b.version().to_string()))
            .field("decks", &self.decks)
            .field("profiles", &self.profiles)
            .field("max_downs", &self.max_downs)
            .finish_non_exhaustive()
    }
}

impl GameSetup {
    /// Default config, balanced coaches, first deck on both sides.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, resolver: Arc<dyn PlayResolver>) -> Self {
        Self {
            config: EngineConfig::default(),
            catalog,
            resolver,
            book: None,
            decks: [None, None],
            profiles: [CoachProfile::balanced(), CoachProfile::balanced()],
            max_downs: DEFAULT_MAX_DOWNS,
        }
    }

    /// Replaces the config.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Checks pairings against this book.
    #[must_use]
    pub fn with_book(mut self, book: Arc<MatchupBook>) -> Self {
        self.book = Some(book);
        self
    }

    /// Sets both coach profiles.
    #[must_use]
    pub fn with_profiles(mut self, home: CoachProfile, away: CoachProfile) -> Self {
        self.profiles = [home, away];
        self
    }
}

// =============================================================================
// Per-game results
// =============================================================================

/// Observed results of one offense/defense card pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairingStats {
    /// Offensive card id.
    pub offense: String,
    /// Defensive card id.
    pub defense: String,
    /// Plays run.
    pub plays: u32,
    /// Plays that turned the ball over.
    pub turnovers: u32,
    /// Net yards, penalties and turnovers counting zero.
    pub yards: i64,
}

impl PairingStats {
    /// Turnovers per play.
    #[must_use]
    pub fn turnover_rate(&self) -> f64 {
        ratio(f64::from(self.turnovers), self.plays)
    }

    /// Mean yards per play.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn yards_per_play(&self) -> f64 {
        ratio(self.yards as f64, self.plays)
    }
}

fn ratio(numerator: f64, plays: u32) -> f64 {
    if plays == 0 {
        0.0
    } else {
        numerator / f64::from(plays)
    }
}

type PairingKey = (String, String);

fn tally_pairings(events: &[GameEvent], into: &mut BTreeMap<PairingKey, PairingStats>) {
    for event in events {
        let GameEvent::Play {
            offense_card,
            defense_card,
            outcome,
            yards,
            ..
        } = event
        else {
            continue;
        };
        let entry = into
            .entry((offense_card.clone(), defense_card.clone()))
            .or_insert_with(|| PairingStats {
                offense: offense_card.clone(),
                defense: defense_card.clone(),
                ..PairingStats::default()
            });
        entry.plays += 1;
        entry.turnovers += u32::from(outcome.is_turnover());
        entry.yards += i64::from(*yards);
    }
}

/// Result of one simulated game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    /// Dice seed.
    pub seed: u64,
    /// Final score.
    pub score: Score,
    /// Winner, `None` for a tie.
    pub winner: Option<Side>,
    /// Downs played.
    pub downs: u32,
    /// Box score.
    pub stats: GameStats,
    /// Per-pairing results, in card-id order.
    pub pairings: Vec<PairingStats>,
}

/// Plays one full game with computer coaches on both sides.
///
/// # Errors
///
/// Any [`EngineError`] from building or running the game, including
/// [`EngineError::DownLimit`].
pub fn simulate_game(setup: &GameSetup, seed: u64) -> Result<GameSummary, EngineError> {
    let mut builder = GameBuilder::new()
        .config(setup.config.clone())
        .catalog(Arc::clone(&setup.catalog))
        .resolver(Arc::clone(&setup.resolver))
        .seed(seed);
    for (side, (profile, deck)) in Side::BOTH
        .into_iter()
        .zip(setup.profiles.iter().zip(&setup.decks))
    {
        builder = builder.controller(side, Controller::Ai(profile.clone()));
        if let Some(deck) = deck {
            builder = builder.deck(side, deck.clone());
        }
    }
    let mut game = builder.build()?;
    game.run_to_completion(setup.max_downs)?;

    let mut pairings = BTreeMap::new();
    tally_pairings(game.events(), &mut pairings);
    let state = game.state();
    Ok(GameSummary {
        seed,
        score: state.score,
        winner: state.score.leader(),
        downs: game.downs_played(),
        stats: *game.stats(),
        pairings: pairings.into_values().collect(),
    })
}

// =============================================================================
// Batch
// =============================================================================

/// A pairing whose observed rates fall outside its declared bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundViolation {
    /// Offensive card id.
    pub offense: String,
    /// Defensive card id.
    pub defense: String,
    /// Plays observed.
    pub plays: u32,
    /// What was out of bounds.
    pub message: String,
}

/// Aggregated results of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Games played.
    pub games: u32,
    /// Home wins.
    pub home_wins: u32,
    /// Away wins.
    pub away_wins: u32,
    /// Tied games.
    pub ties: u32,
    /// Mean Home points per game.
    pub mean_home_points: f64,
    /// Mean Away points per game.
    pub mean_away_points: f64,
    /// Net yards per scrimmage play, both sides.
    pub yards_per_play: f64,
    /// Turnovers per scrimmage play, both sides.
    pub turnover_rate: f64,
    /// Per-pairing totals, in card-id order.
    pub pairings: Vec<PairingStats>,
    /// Pairings outside their declared bounds.
    pub violations: Vec<BoundViolation>,
}

impl BatchSummary {
    /// Folds finished games into totals. With a book, every pairing that has
    /// a table and at least [`MIN_PAIRING_PLAYS`] plays is checked against
    /// the table's declared bounds.
    #[must_use]
    pub fn aggregate(games: &[GameSummary], book: Option<&MatchupBook>) -> Self {
        let mut home_wins = 0;
        let mut away_wins = 0;
        let mut ties = 0;
        let mut home_points = 0u64;
        let mut away_points = 0u64;
        let mut plays = 0u32;
        let mut yards = 0i64;
        let mut turnovers = 0u32;
        let mut pairings: BTreeMap<PairingKey, PairingStats> = BTreeMap::new();

        for game in games {
            match game.winner {
                Some(Side::Home) => home_wins += 1,
                Some(Side::Away) => away_wins += 1,
                None => ties += 1,
            }
            home_points += u64::from(game.score.home);
            away_points += u64::from(game.score.away);
            for pairing in &game.pairings {
                plays += pairing.plays;
                yards += pairing.yards;
                turnovers += pairing.turnovers;
                let total = pairings
                    .entry((pairing.offense.clone(), pairing.defense.clone()))
                    .or_insert_with(|| PairingStats {
                        offense: pairing.offense.clone(),
                        defense: pairing.defense.clone(),
                        ..PairingStats::default()
                    });
                total.plays += pairing.plays;
                total.turnovers += pairing.turnovers;
                total.yards += pairing.yards;
            }
        }

        let violations = book.map_or_else(Vec::new, |book| check_pairings(&pairings, book));
        let overall = PairingStats {
            plays,
            turnovers,
            yards,
            ..PairingStats::default()
        };
        let count = u32::try_from(games.len()).unwrap_or(u32::MAX);
        #[allow(clippy::cast_precision_loss)]
        let mean = |points: u64| ratio(points as f64, count);
        Self {
            games: count,
            home_wins,
            away_wins,
            ties,
            mean_home_points: mean(home_points),
            mean_away_points: mean(away_points),
            yards_per_play: overall.yards_per_play(),
            turnover_rate: overall.turnover_rate(),
            pairings: pairings.into_values().collect(),
            violations,
        }
    }
}

fn check_pairings(
    pairings: &BTreeMap<PairingKey, PairingStats>,
    book: &MatchupBook,
) -> Vec<BoundViolation> {
    let mut violations = Vec::new();
    for ((offense, defense), stats) in pairings {
        if stats.plays < MIN_PAIRING_PLAYS {
            continue;
        }
        let Some(table) = book.table(offense, defense) else {
            continue;
        };
        for message in table
            .meta()
            .check_bounds(stats.turnover_rate(), stats.yards_per_play())
        {
            warn!(%offense, %defense, plays = stats.plays, %message, "pairing outside declared bounds");
            violations.push(BoundViolation {
                offense: offense.clone(),
                defense: defense.clone(),
                plays: stats.plays,
                message,
            });
        }
    }
    violations
}

/// Runs `games` games in parallel with seeds `base_seed`, `base_seed + 1`,
/// and so on.
///
/// # Errors
///
/// The first failing game's error, in seed order.
pub fn simulate_batch(
    setup: &GameSetup,
    games: u32,
    base_seed: u64,
) -> Result<BatchSummary, EngineError> {
    info!(games, base_seed, resolver = setup.resolver.name(), "batch started");
    let summaries = (0..games)
        .into_par_iter()
        .map(|i| simulate_game(setup, base_seed.wrapping_add(u64::from(i))))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = BatchSummary::aggregate(&summaries, setup.book.as_deref());
    info!(
        home_wins = summary.home_wins,
        away_wins = summary.away_wins,
        ties = summary.ties,
        violations = summary.violations.len(),
        "batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ChartResolver, DiceTableResolver};
    use playbook::data::{standard_catalog, standard_chart, standard_matchups};

    fn chart_setup() -> GameSetup {
        GameSetup::new(
            Arc::new(standard_catalog().unwrap()),
            Arc::new(ChartResolver::new(Arc::new(standard_chart().unwrap()))),
        )
    }

    fn pairing(offense: &str, defense: &str, plays: u32, turnovers: u32, yards: i64) -> PairingStats {
        PairingStats {
            offense: offense.to_string(),
            defense: defense.to_string(),
            plays,
            turnovers,
            yards,
        }
    }

    fn summary(seed: u64, score: Score, pairings: Vec<PairingStats>) -> GameSummary {
        GameSummary {
            seed,
            score,
            winner: score.leader(),
            downs: 150,
            stats: GameStats::default(),
            pairings,
        }
    }

    #[test]
    fn batch_counts_every_game() {
        let summary = simulate_batch(&chart_setup(), 6, 100).unwrap();
        assert_eq!(summary.games, 6);
        assert_eq!(summary.home_wins + summary.away_wins + summary.ties, 6);
        assert!(summary.yards_per_play.is_finite());
        assert!(summary.pairings.iter().all(|p| p.plays > 0));
    }

    #[test]
    fn batches_are_reproducible() {
        let setup = chart_setup();
        let first = simulate_batch(&setup, 4, 7).unwrap();
        let second = simulate_batch(&setup, 4, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dice_backend_with_chart_fallback_plays_full_games() {
        let book = Arc::new(standard_matchups().unwrap());
        let chart = ChartResolver::new(Arc::new(standard_chart().unwrap()));
        let resolver = DiceTableResolver::new(Arc::clone(&book)).with_fallback(Box::new(chart));
        let setup = GameSetup::new(Arc::new(standard_catalog().unwrap()), Arc::new(resolver))
            .with_book(book);
        let game = simulate_game(&setup, 31).unwrap();
        assert!(game.downs > 0);
        assert_eq!(game.winner, game.score.leader());
    }

    #[test]
    fn aggregate_totals() {
        let games = vec![
            summary(1, Score { home: 21, away: 14 }, vec![pairing("a", "x", 10, 1, 50)]),
            summary(2, Score { home: 10, away: 10 }, vec![pairing("a", "x", 10, 0, 30)]),
        ];
        let total = BatchSummary::aggregate(&games, None);
        assert_eq!((total.home_wins, total.away_wins, total.ties), (1, 0, 1));
        assert!((total.mean_home_points - 15.5).abs() < 1e-9);
        assert!((total.yards_per_play - 4.0).abs() < 1e-9);
        assert!((total.turnover_rate - 0.05).abs() < 1e-9);
        assert_eq!(total.pairings, vec![pairing("a", "x", 20, 1, 80)]);
    }

    #[test]
    fn out_of_bounds_pairings_are_reported() {
        let book = standard_matchups().unwrap();
        let games = vec![summary(
            1,
            Score::default(),
            vec![
                // 10% turnovers, 1 yard per play: both bounds broken.
                pairing("pro-off-tackle", "def-43-base", 300, 30, 300),
                // Too few plays to judge.
                pairing("pro-short-pass", "def-nickel", 50, 40, 0),
                // No table.
                pairing("pro-draw", "def-dime", 500, 400, 0),
            ],
        )];
        let total = BatchSummary::aggregate(&games, Some(&book));
        assert_eq!(total.violations.len(), 2);
        assert!(total
            .violations
            .iter()
            .all(|v| v.offense == "pro-off-tackle" && v.plays == 300));
    }
}
