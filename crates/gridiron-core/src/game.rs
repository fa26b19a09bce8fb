//! Game orchestrator.
//!
//! [`Game`] owns the only mutable [`GameState`] and advances it one down at
//! a time. Each down is a transaction over a second state buffer:
//!
//! 1. **CALL**: the call is checked against the committed state
//! 2. **RESOLVE**: the resolver and special-teams sub-engines roll dice and
//!    produce a [`Projection`]
//! 3. **CLOCK**: time is charged, quarters roll over, owed kicks follow
//! 4. **COMMIT**: the buffers swap and the transaction's events publish
//!
//! A choice owed by a human-controlled side pauses the transaction between
//! steps 2 and 4. The committed state does not change while paused; another
//! down is refused until [`Game::submit_decision`] resumes it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridiron_core::game::GameBuilder;
//! use gridiron_core::resolver::ChartResolver;
//! use playbook::data::{standard_catalog, standard_chart};
//!
//! let mut game = GameBuilder::new()
//!     .catalog(Arc::new(standard_catalog().unwrap()))
//!     .resolver(Arc::new(ChartResolver::new(Arc::new(standard_chart().unwrap()))))
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! game.run_to_completion(2_000).unwrap();
//! assert!(game.is_over());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use playbook::{
    CardCatalog, Deck, OffenseCategory, OutcomeKind, OutcomeRecord, RandomSource, SeededDice,
};

use crate::ai::{policy, CoachProfile};
use crate::call::PlayCall;
use crate::clock::{self, Rollover};
use crate::config::EngineConfig;
use crate::decision::{
    Decision, DecisionRequest, FreeKickChoice, PenaltyChoice, PuntReturnChoice,
};
use crate::error::{CallError, EngineError};
use crate::event::{ConversionKind, GameEvent};
use crate::penalty;
use crate::resolver::{resolve_call, PlayResolver};
use crate::special_teams::{kickoff, place_kick, punt, KickoffKind, PuntLanding};
use crate::state::{GameState, Side};
use crate::stats::GameStats;
use crate::tracker::{self, FollowUp, Projection};

// =============================================================================
// Controllers and progress
// =============================================================================

/// Who makes a side's calls and decisions.
#[derive(Debug, Clone, PartialEq)]
pub enum Controller {
    /// Calls come from outside; decisions pause the game.
    Human,
    /// The computer coach with this profile.
    Ai(CoachProfile),
}

impl Default for Controller {
    fn default() -> Self {
        Self::Ai(CoachProfile::balanced())
    }
}

/// Result of driving a transaction.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The down and everything it triggered were committed.
    Resolved,
    /// Paused until the request is answered.
    Decision(DecisionRequest),
}

const fn slot(side: Side) -> usize {
    match side {
        Side::Home => 0,
        Side::Away => 1,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`Game`].
///
/// Catalog, resolver and a random source are required. Each side defaults to
/// the balanced computer coach and the catalog's first deck.
#[derive(Default)]
pub struct GameBuilder {
    config: EngineConfig,
    catalog: Option<Arc<CardCatalog>>,
    resolver: Option<Arc<dyn PlayResolver>>,
    dice: Option<Box<dyn RandomSource>>,
    controllers: [Controller; 2],
    decks: [Option<String>; 2],
    starting_state: Option<GameState>,
}

impl fmt::Debug for GameBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameBuilder")
            .field("config", &self.config)
            .field("resolver", &self.resolver.as_ref().map(|r| r.name().to_string()))
            .field("has_dice", &self.dice.is_some())
            .field("controllers", &self.controllers)
            .field("decks", &self.decks)
            .finish_non_exhaustive()
    }
}

impl GameBuilder {
    /// An empty builder with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule constants.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Card catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<CardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Play resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn PlayResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Random source.
    #[must_use]
    pub fn dice(mut self, dice: impl RandomSource + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    /// Seeded random source.
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        self.dice(SeededDice::new(seed))
    }

    /// Controller for one side.
    #[must_use]
    pub fn controller(mut self, side: Side, controller: Controller) -> Self {
        self.controllers[slot(side)] = controller;
        self
    }

    /// Offensive deck for one side, by name.
    #[must_use]
    pub fn deck(mut self, side: Side, name: impl Into<String>) -> Self {
        self.decks[slot(side)] = Some(name.into());
        self
    }

    /// Starts from a given state instead of the opening kickoff. The game
    /// counts as started.
    #[must_use]
    pub fn starting_state(mut self, state: GameState) -> Self {
        self.starting_state = Some(state);
        self
    }

    /// Builds the game.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for an invalid config, the `Missing*` variants
    /// for absent parts, [`EngineError::UnknownDeck`] for a deck the catalog
    /// does not have.
    pub fn build(self) -> Result<Game, EngineError> {
        self.config.validate()?;
        let dice = self.dice.ok_or(EngineError::MissingRandomSource)?;
        let resolver = self.resolver.ok_or(EngineError::MissingResolver)?;
        let catalog = self.catalog.ok_or(EngineError::MissingCatalog)?;

        let [home, away] = self.decks;
        let decks = [
            resolve_deck(&catalog, home)?,
            resolve_deck(&catalog, away)?,
        ];

        let started = self.starting_state.is_some();
        let state = self
            .starting_state
            .unwrap_or_else(|| GameState::new(self.config.quarter_seconds));
        Ok(Game {
            next: state.clone(),
            state,
            config: self.config,
            catalog,
            resolver,
            dice,
            controllers: self.controllers,
            decks,
            work: Transaction::default(),
            pending: None,
            events: Vec::new(),
            stats: GameStats::default(),
            started,
            downs: 0,
        })
    }
}

fn resolve_deck(catalog: &CardCatalog, name: Option<String>) -> Result<String, EngineError> {
    match name {
        Some(name) if catalog.deck(&name).is_some() => Ok(name),
        Some(name) => Err(EngineError::UnknownDeck(name)),
        None => catalog
            .decks
            .first()
            .map(|deck| deck.name.clone())
            .ok_or_else(|| EngineError::UnknownDeck(String::new())),
    }
}

// =============================================================================
// Transaction internals
// =============================================================================

/// Scratch for the transaction in flight.
#[derive(Debug, Default)]
struct Transaction {
    follow_up: Option<FollowUp>,
    events: Vec<GameEvent>,
}

/// How to continue once a decision arrives.
#[derive(Debug)]
enum Resume {
    Penalty {
        accept: Box<Projection>,
        decline: Box<Projection>,
    },
    PuntReturn {
        kicker: Side,
        distance: u8,
    },
    KickoffType {
        kicker: Side,
    },
    FreeKick {
        kicker: Side,
    },
}

#[derive(Debug)]
struct Pending {
    request: DecisionRequest,
    resume: Resume,
}

enum Step {
    Play(Projection),
    Pause(Pending),
}

fn play_event(pre: &GameState, call: &PlayCall, record: &OutcomeRecord) -> GameEvent {
    GameEvent::Play {
        offense: pre.possession,
        offense_card: call.offense.id.clone(),
        defense_card: call.defense.id.clone(),
        category: call.category(),
        outcome: record.kind.clone(),
        yards: record.kind.net_yards(),
        out_of_bounds: record.out_of_bounds,
        source: record.source.clone(),
    }
}

// =============================================================================
// Game
// =============================================================================

/// One game in progress.
pub struct Game {
    config: EngineConfig,
    catalog: Arc<CardCatalog>,
    resolver: Arc<dyn PlayResolver>,
    dice: Box<dyn RandomSource>,
    controllers: [Controller; 2],
    decks: [String; 2],
    /// Committed state.
    state: GameState,
    /// State being built by the transaction in flight.
    next: GameState,
    work: Transaction,
    pending: Option<Pending>,
    events: Vec<GameEvent>,
    stats: GameStats,
    started: bool,
    downs: u32,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("resolver", &self.resolver.name())
            .field("controllers", &self.controllers)
            .field("decks", &self.decks)
            .field("pending", &self.pending.as_ref().map(|p| p.request.kind))
            .field("downs", &self.downs)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Tosses the coin and plays the opening kickoff.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyStarted`] on a second call.
    pub fn start(&mut self) -> Result<Progress, EngineError> {
        if self.started {
            return Err(EngineError::AlreadyStarted);
        }
        self.started = true;
        self.next.clone_from(&self.state);
        self.work = Transaction::default();

        let receiver = if self.dice.roll_die(2) == 1 {
            Side::Home
        } else {
            Side::Away
        };
        self.next.second_half_receiver = receiver.opposite();
        info!(%receiver, "coin toss");
        self.work.events.push(GameEvent::CoinToss { receiver });

        let projection = self.kickoff(receiver.opposite(), KickoffKind::Normal, false);
        Ok(self.advance(projection))
    }

    /// Resolves one down with the given call.
    ///
    /// On a conversion try a field-goal card kicks for one and a run or pass
    /// card plays for two.
    ///
    /// # Errors
    ///
    /// Refused without touching the state when the game has not started, is
    /// over, or awaits a decision, and when the call is illegal.
    pub fn resolve_down(&mut self, call: &PlayCall) -> Result<Progress, EngineError> {
        self.check_ready()?;
        let in_deck = self
            .deck(self.state.possession)
            .is_some_and(|deck| deck.cards.iter().any(|card| card.id == call.offense.id));
        if !in_deck {
            return Err(CallError::NotInDeck(call.offense.id.clone()).into());
        }
        if self.catalog.defense_card(&call.defense.id) != Some(&call.defense) {
            return Err(CallError::UnknownDefense(call.defense.id.clone()).into());
        }
        call.validate(&self.state, &self.config)?;

        self.next.clone_from(&self.state);
        self.work = Transaction::default();
        self.downs += 1;

        let step = if self.state.awaiting_pat() {
            self.conversion(call)
        } else {
            match call.category() {
                OffenseCategory::Run | OffenseCategory::Pass => self.scrimmage(call),
                OffenseCategory::Punt => self.punt(),
                OffenseCategory::FieldGoal => Step::Play(self.field_goal()),
            }
        };
        Ok(match step {
            Step::Play(projection) => self.advance(projection),
            Step::Pause(pending) => self.pause(pending),
        })
    }

    /// Answers the pending request and finishes the paused transaction.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoPendingDecision`] when nothing is pending;
    /// [`EngineError::DecisionMismatch`] for an answer of the wrong kind, in
    /// which case the request stays pending.
    pub fn submit_decision(&mut self, decision: Decision) -> Result<Progress, EngineError> {
        let Some(pending) = self.pending.take() else {
            return Err(EngineError::NoPendingDecision);
        };
        debug!(?decision, "decision received");
        let projection = match (pending.resume, decision) {
            (Resume::Penalty { accept, decline }, Decision::Penalty(choice)) => match choice {
                PenaltyChoice::Accept => *accept,
                PenaltyChoice::Decline => *decline,
            },
            (Resume::PuntReturn { kicker, distance }, Decision::PuntReturn(choice)) => {
                self.finish_punt(kicker, distance, choice)
            }
            (Resume::KickoffType { kicker }, Decision::KickoffType(kind)) => {
                self.kickoff(kicker, kind, false)
            }
            (Resume::FreeKick { kicker }, Decision::FreeKick(choice)) => {
                self.free_kick(kicker, choice)
            }
            (resume, decision) => {
                let expected = pending.request.kind;
                self.pending = Some(Pending {
                    request: pending.request,
                    resume,
                });
                return Err(EngineError::DecisionMismatch {
                    expected,
                    got: decision.kind(),
                });
            }
        };
        Ok(self.advance(projection))
    }

    /// Lets the computer pick the offensive card for the side with the ball.
    /// Human sides get the balanced profile.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoLegalCall`] when the deck has no legal card.
    pub fn ai_offense(&mut self) -> Result<playbook::OffenseCard, EngineError> {
        let side = self.state.possession;
        let profile = self.profile(side).cloned().unwrap_or_default();
        let deck = self
            .catalog
            .deck(&self.decks[slot(side)])
            .ok_or_else(|| EngineError::UnknownDeck(self.decks[slot(side)].clone()))?;
        policy::choose_offense(&self.state, deck, &profile, &self.config, &mut *self.dice)
            .ok_or(EngineError::NoLegalCall(side))
    }

    /// Lets the computer pick the defensive card.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoLegalCall`] when the catalog has no defensive cards.
    pub fn ai_defense(&mut self) -> Result<playbook::DefenseCard, EngineError> {
        policy::choose_defense(&self.state, &self.catalog, &self.config.ai, &mut *self.dice)
            .ok_or(EngineError::NoLegalCall(self.state.defense()))
    }

    /// Computer calls for both sides.
    ///
    /// # Errors
    ///
    /// See [`Game::ai_offense`] and [`Game::ai_defense`].
    pub fn ai_call(&mut self) -> Result<PlayCall, EngineError> {
        let offense = self.ai_offense()?;
        let defense = self.ai_defense()?;
        Ok(PlayCall::new(offense, defense))
    }

    /// Plays one down with computer calls for both sides.
    ///
    /// # Errors
    ///
    /// See [`Game::resolve_down`].
    pub fn play_ai_down(&mut self) -> Result<Progress, EngineError> {
        self.check_ready()?;
        let call = self.ai_call()?;
        self.resolve_down(&call)
    }

    /// What the computer would answer to the pending request, judged by the
    /// decider's profile (balanced for human sides).
    #[must_use]
    pub fn suggest_decision(&self) -> Option<Decision> {
        let pending = self.pending.as_ref()?;
        let decider = pending.request.decider;
        let profile = self.profile(decider).cloned().unwrap_or_default();
        Some(policy::decide(
            &pending.request,
            &self.next,
            &profile,
            &self.config.ai,
        ))
    }

    /// Plays computer downs until the game ends, answering every pending
    /// request with [`Game::suggest_decision`]. Starts the game if needed.
    ///
    /// # Errors
    ///
    /// [`EngineError::DownLimit`] when `max_downs` downs have been played
    /// without a result, or any error from the calls on the way.
    pub fn run_to_completion(&mut self, max_downs: u32) -> Result<(), EngineError> {
        let mut progress = if self.started {
            self.pending
                .as_ref()
                .map_or(Progress::Resolved, |p| Progress::Decision(p.request.clone()))
        } else {
            self.start()?
        };
        loop {
            progress = match progress {
                Progress::Decision(_) => {
                    let decision = self
                        .suggest_decision()
                        .ok_or(EngineError::NoPendingDecision)?;
                    self.submit_decision(decision)?
                }
                Progress::Resolved if self.state.is_over() => return Ok(()),
                Progress::Resolved if self.downs >= max_downs => {
                    return Err(EngineError::DownLimit(max_downs));
                }
                Progress::Resolved => self.play_ai_down()?,
            };
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Committed state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Committed events not yet taken.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drains the committed events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Totals so far.
    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// The request the game is paused on.
    #[must_use]
    pub fn pending_decision(&self) -> Option<&DecisionRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    /// Rule constants.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Card catalog.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// A side's offensive deck.
    #[must_use]
    pub fn deck(&self, side: Side) -> Option<&Deck> {
        self.catalog.deck(&self.decks[slot(side)])
    }

    /// A side's controller.
    #[must_use]
    pub fn controller(&self, side: Side) -> &Controller {
        &self.controllers[slot(side)]
    }

    /// Whether the opening kickoff has happened.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Downs resolved so far, conversion tries included.
    #[must_use]
    pub fn downs_played(&self) -> u32 {
        self.downs
    }

    // -------------------------------------------------------------------------
    // Transaction steps
    // -------------------------------------------------------------------------

    fn check_ready(&self) -> Result<(), EngineError> {
        if !self.started {
            return Err(EngineError::NotStarted);
        }
        if self.state.is_over() {
            return Err(EngineError::GameOver);
        }
        if let Some(pending) = &self.pending {
            return Err(EngineError::AwaitingDecision(pending.request.kind));
        }
        Ok(())
    }

    fn profile(&self, side: Side) -> Option<&CoachProfile> {
        match &self.controllers[slot(side)] {
            Controller::Ai(profile) => Some(profile),
            Controller::Human => None,
        }
    }

    fn is_human(&self, side: Side) -> bool {
        self.controllers[slot(side)] == Controller::Human
    }

    fn scrimmage(&mut self, call: &PlayCall) -> Step {
        let record = resolve_call(&*self.resolver, call, &mut *self.dice);
        debug!(
            offense = %call.offense.id,
            defense = %call.defense.id,
            outcome = ?record.kind,
            "play resolved"
        );
        self.work.events.push(play_event(&self.next, call, &record));

        let OutcomeKind::Penalty(foul) = &record.kind else {
            return Step::Play(tracker::play(&self.next, &record, &self.config));
        };
        let accept = penalty::accept(&self.next, foul, &record);
        let decline = penalty::decline(&self.next, foul, &record, &self.config);
        let decider = penalty::decider(&self.next, foul);
        if self.is_human(decider) {
            return Step::Pause(Pending {
                request: DecisionRequest::penalty(decider, &accept.state, &decline.state),
                resume: Resume::Penalty {
                    accept: Box::new(accept),
                    decline: Box::new(decline),
                },
            });
        }
        if penalty::prefers_accept(&accept.state, &decline.state, decider) {
            Step::Play(accept)
        } else {
            Step::Play(decline)
        }
    }

    fn punt(&mut self) -> Step {
        let kicker = self.next.possession;
        let distance = punt::roll_distance(&mut *self.dice);
        let landing = PuntLanding::from_kick(self.next.los(), distance);
        if let Some(result) =
            punt::resolve_landing(&mut *self.dice, distance, landing, self.config.touchback_spot)
        {
            return Step::Play(tracker::punt(&self.next, kicker, &result, false, &self.config));
        }
        let receiver = kicker.opposite();
        if self.is_human(receiver) {
            return Step::Pause(Pending {
                request: DecisionRequest::punt_return(receiver),
                resume: Resume::PuntReturn { kicker, distance },
            });
        }
        let choice = policy::choose_punt_return(&self.next, receiver, &self.config.ai);
        Step::Play(self.finish_punt(kicker, distance, choice))
    }

    fn finish_punt(&mut self, kicker: Side, distance: u8, choice: PuntReturnChoice) -> Projection {
        let result =
            punt::finish_goal_line(&mut *self.dice, distance, choice, self.config.touchback_spot);
        tracker::punt(
            &self.next,
            kicker,
            &result,
            choice == PuntReturnChoice::Down,
            &self.config,
        )
    }

    fn field_goal(&mut self) -> Projection {
        let kick = place_kick::attempt(&mut *self.dice, self.next.yards_to_goal(), false);
        tracker::field_goal(&self.next, &kick, &self.config)
    }

    fn conversion(&mut self, call: &PlayCall) -> Step {
        if call.category() == OffenseCategory::FieldGoal {
            let kick = place_kick::attempt(&mut *self.dice, self.next.yards_to_goal(), true);
            return Step::Play(tracker::conversion(&self.next, ConversionKind::Kick, kick.success));
        }
        let record = resolve_call(&*self.resolver, call, &mut *self.dice);
        self.work.events.push(play_event(&self.next, call, &record));
        let good = match &record.kind {
            OutcomeKind::Penalty(foul) => tracker::two_point_good(&self.next, &foul.declined_play()),
            kind => tracker::two_point_good(&self.next, kind),
        };
        Step::Play(tracker::conversion(&self.next, ConversionKind::TwoPoint, good))
    }

    fn kickoff(&mut self, kicker: Side, kind: KickoffKind, free_kick: bool) -> Projection {
        let mut result = match kind {
            KickoffKind::Normal => kickoff::normal(&mut *self.dice, &self.config),
            KickoffKind::Onside => kickoff::onside(&mut *self.dice, self.next.score.margin(kicker) < 0),
        };
        if free_kick {
            result = result.with_free_kick_bonus(self.config.free_kick_bonus, self.config.free_kick_cap);
        }
        tracker::kickoff(&self.next, kicker, &result, &self.config)
    }

    fn free_kick(&mut self, kicker: Side, choice: FreeKickChoice) -> Projection {
        match choice {
            FreeKickChoice::Kickoff => self.kickoff(kicker, KickoffKind::Normal, true),
            FreeKickChoice::Punt => {
                let touchback = self.config.touchback_spot;
                let distance = punt::roll_distance(&mut *self.dice);
                let landing = PuntLanding::from_kick(self.config.free_kick_punt_spot, distance);
                let (result, downed) =
                    match punt::resolve_landing(&mut *self.dice, distance, landing, touchback) {
                        Some(result) => (result, false),
                        None => (
                            punt::finish_goal_line(
                                &mut *self.dice,
                                distance,
                                PuntReturnChoice::Down,
                                touchback,
                            ),
                            true,
                        ),
                    };
                tracker::punt(&self.next, kicker, &result, downed, &self.config)
            }
        }
    }

    fn pause(&mut self, pending: Pending) -> Progress {
        let request = pending.request.clone();
        debug!(kind = %request.kind, decider = %request.decider, "awaiting decision");
        self.pending = Some(pending);
        Progress::Decision(request)
    }

    /// Folds a projection into the working state, then runs the clock.
    fn absorb(&mut self, projection: Projection) {
        let Projection {
            state,
            events,
            follow_up,
            charge,
            schedules_untimed,
        } = projection;
        self.next = state;
        self.work.events.extend(events);
        if follow_up.is_some() {
            self.work.follow_up = follow_up;
        }
        if self.next.is_over() {
            self.work.follow_up = None;
            return;
        }

        let seconds = clock::time_off(&charge, self.next.flags, &self.config.time_off);
        clock::run_off(
            &mut self.next,
            seconds,
            self.config.two_minute_threshold,
            &mut self.work.events,
        );
        if schedules_untimed {
            clock::schedule_untimed_down(&mut self.next, &mut self.work.events);
        }
        match clock::rollover(&mut self.next, &self.config, &mut *self.dice, &mut self.work.events) {
            Rollover::Continue => {}
            Rollover::Kickoff { receiver } => {
                self.work.follow_up = Some(FollowUp::Kickoff {
                    kicker: receiver.opposite(),
                    choose: false,
                });
            }
            Rollover::Ended => self.work.follow_up = None,
        }
    }

    /// Absorbs projections and plays owed kicks until the transaction
    /// commits or pauses.
    fn advance(&mut self, mut projection: Projection) -> Progress {
        loop {
            self.absorb(projection);
            let Some(follow_up) = self.work.follow_up.take() else {
                self.commit();
                return Progress::Resolved;
            };
            projection = match follow_up {
                FollowUp::Kickoff {
                    kicker,
                    choose: false,
                } => self.kickoff(kicker, KickoffKind::Normal, false),
                FollowUp::Kickoff {
                    kicker,
                    choose: true,
                } => {
                    let kind = self
                        .profile(kicker)
                        .map(|profile| policy::choose_kickoff(&self.next, kicker, profile, &self.config.ai));
                    let Some(kind) = kind else {
                        return self.pause(Pending {
                            request: DecisionRequest::kickoff_type(kicker),
                            resume: Resume::KickoffType { kicker },
                        });
                    };
                    self.kickoff(kicker, kind, false)
                }
                FollowUp::FreeKick { kicker } => {
                    if self.is_human(kicker) {
                        return self.pause(Pending {
                            request: DecisionRequest::free_kick(kicker),
                            resume: Resume::FreeKick { kicker },
                        });
                    }
                    self.free_kick(kicker, FreeKickChoice::Kickoff)
                }
            };
        }
    }

    fn commit(&mut self) {
        std::mem::swap(&mut self.state, &mut self.next);
        for event in self.work.events.drain(..) {
            self.stats.record(&event);
            self.events.push(event);
        }
        debug!(state = %self.state, "transaction committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ChartResolver;
    use playbook::data::{standard_catalog, standard_chart};
    use playbook::{DefenseCard, DefenseCategory, ScriptedDice};

    fn builder() -> GameBuilder {
        GameBuilder::new()
            .catalog(Arc::new(standard_catalog().unwrap()))
            .resolver(Arc::new(ChartResolver::new(Arc::new(standard_chart().unwrap()))))
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn random_source_is_required() {
            let err = builder().build().unwrap_err();
            assert!(matches!(err, EngineError::MissingRandomSource));
        }

        #[test]
        fn resolver_and_catalog_are_required() {
            let err = GameBuilder::new().seed(1).build().unwrap_err();
            assert!(matches!(err, EngineError::MissingResolver));
        }

        #[test]
        fn unknown_deck_is_rejected() {
            let err = builder().seed(1).deck(Side::Away, "Wishbone").build().unwrap_err();
            assert!(matches!(err, EngineError::UnknownDeck(name) if name == "Wishbone"));
        }

        #[test]
        fn invalid_config_is_rejected() {
            let mut config = EngineConfig::default();
            config.quarter_seconds = 0;
            let err = builder().seed(1).config(config).build().unwrap_err();
            assert!(matches!(err, EngineError::Config(_)));
        }

        #[test]
        fn defaults_to_the_first_deck() {
            let game = builder().seed(1).build().unwrap();
            let first = &game.catalog().decks[0].name;
            assert_eq!(&game.deck(Side::Home).unwrap().name, first);
            assert!(!game.is_started());
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn opening_kickoff() {
            // d2 = 1: Home receives. Kickoff 3+4 = 7 lands at the 25.
            let mut game = builder().dice(ScriptedDice::new(vec![1, 3, 4])).build().unwrap();
            assert_eq!(game.start().unwrap(), Progress::Resolved);

            let state = game.state();
            assert_eq!(state.possession, Side::Home);
            assert_eq!(state.los(), 25);
            assert_eq!(state.second_half_receiver, Side::Away);
            assert_eq!(state.clock, 890);
            assert!(matches!(game.events()[0], GameEvent::CoinToss { receiver: Side::Home }));
            assert!(matches!(game.start(), Err(EngineError::AlreadyStarted)));
        }

        #[test]
        fn downs_need_a_started_game() {
            let mut game = builder().seed(3).build().unwrap();
            let call = game.ai_call().unwrap();
            assert!(matches!(game.resolve_down(&call), Err(EngineError::NotStarted)));
        }

        #[test]
        fn cards_outside_the_deck_are_refused() {
            let mut game = builder().seed(3).build().unwrap();
            assert_eq!(game.start().unwrap(), Progress::Resolved);
            let mut call = game.ai_call().unwrap();
            call.offense.id = "college-option".to_string();
            let before = game.state().clone();
            let err = game.resolve_down(&call).unwrap_err();
            assert!(matches!(err, EngineError::InvalidCall(CallError::NotInDeck(_))));
            assert_eq!(game.state(), &before);
        }

        #[test]
        fn unknown_defense_cards_are_refused() {
            let mut game = builder().seed(3).build().unwrap();
            assert_eq!(game.start().unwrap(), Progress::Resolved);
            let mut call = game.ai_call().unwrap();
            call.defense =
                DefenseCard::new("def-made-up", "Made Up", 'Z', DefenseCategory::Balanced);
            let before = game.state().clone();
            let events = game.events().len();
            let err = game.resolve_down(&call).unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidCall(CallError::UnknownDefense(id)) if id == "def-made-up"
            ));
            assert_eq!(game.state(), &before);
            assert_eq!(game.events().len(), events);
            assert_eq!(game.downs_played(), 0);
        }

        #[test]
        fn take_events_drains() {
            let mut game = builder().seed(5).build().unwrap();
            assert_eq!(game.start().unwrap(), Progress::Resolved);
            assert!(!game.take_events().is_empty());
            assert!(game.events().is_empty());
        }

        #[test]
        fn seeded_game_finishes() {
            let mut game = builder().seed(2024).build().unwrap();
            game.run_to_completion(2_000).unwrap();
            assert!(game.is_over());
            assert!(matches!(game.play_ai_down(), Err(EngineError::GameOver)));
            let last = game.events().last().unwrap();
            assert!(matches!(last, GameEvent::GameOver { .. }));
        }

        #[test]
        fn down_limit() {
            let mut game = builder().seed(9).build().unwrap();
            let err = game.run_to_completion(3).unwrap_err();
            assert!(matches!(err, EngineError::DownLimit(3)));
            assert_eq!(game.downs_played(), 3);
        }
    }
}
