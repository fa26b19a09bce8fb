//! Persistent game state.
//!
//! [`GameState`] is a plain value. The orchestrator owns the only mutable
//! copy and replaces it wholesale at the end of each down.
//!
//! # Field frame
//!
//! `ball_on` is absolute: 0 is the Home goal line, 100 the Away goal line,
//! and Home attacks toward 100. Rule arithmetic happens in the *offense
//! frame*, where 0 is the offense's own goal and 100 the goal it attacks.
//! [`GameState::los`] and [`GameState::set_los`] convert between the two.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Period number used for overtime.
pub const OVERTIME_PERIOD: u8 = 5;

/// Yards from the goal line at which a first down never needs more than ten.
const SERIES_YARDS: u8 = 10;

/// One of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Defends the 0 goal line, attacks toward 100.
    Home,
    /// Defends the 100 goal line, attacks toward 0.
    Away,
}

impl Side {
    /// Both sides, Home first.
    pub const BOTH: [Self; 2] = [Self::Home, Self::Away];

    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Converts an absolute yard line into this side's attacking frame.
    #[must_use]
    pub const fn frame(self, absolute: u8) -> u8 {
        match self {
            Self::Home => absolute,
            Self::Away => 100 - absolute,
        }
    }

    /// Converts a yard line in this side's attacking frame to absolute.
    #[must_use]
    pub const fn absolute(self, frame: u8) -> u8 {
        // The conversion is its own inverse.
        self.frame(frame)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Points for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    /// Home points.
    pub home: u16,
    /// Away points.
    pub away: u16,
}

impl Score {
    /// Points for one side.
    #[must_use]
    pub const fn of(&self, side: Side) -> u16 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Adds points to one side.
    pub fn add(&mut self, side: Side, points: u16) {
        match side {
            Side::Home => self.home = self.home.saturating_add(points),
            Side::Away => self.away = self.away.saturating_add(points),
        }
    }

    /// Score differential from `side`'s point of view.
    #[must_use]
    pub fn margin(&self, side: Side) -> i32 {
        i32::from(self.of(side)) - i32::from(self.of(side.opposite()))
    }

    /// The side ahead, or `None` when tied.
    #[must_use]
    pub fn leader(&self) -> Option<Side> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

bitflags! {
    /// Transient game flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct GameFlags: u8 {
        /// A touchdown was scored; the next call is the conversion try.
        const AWAITING_PAT = 1 << 0;
        /// The game has ended.
        const GAME_OVER = 1 << 1;
        /// The two-minute warning has been given this half.
        const TWO_MINUTE_ANNOUNCED = 1 << 2;
        /// Post-warning clock rules are in force.
        const IN_TWO_MINUTE = 1 << 3;
        /// An untimed down will be played when the period expires.
        const PENDING_UNTIMED_DOWN = 1 << 4;
        /// The current down is untimed.
        const IN_UNTIMED_DOWN = 1 << 5;
    }
}

/// Down, distance, field position, clock and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Period: 1-4, or [`OVERTIME_PERIOD`].
    pub quarter: u8,
    /// Seconds left in the period.
    pub clock: u16,
    /// Current down, 1-4.
    pub down: u8,
    /// Yards to the line to gain.
    pub to_go: u8,
    /// Absolute ball position, 0-100.
    pub ball_on: u8,
    /// Side with the ball.
    pub possession: Side,
    /// Points.
    pub score: Score,
    /// Transient flags.
    pub flags: GameFlags,
    /// Side that receives the second-half kickoff.
    pub second_half_receiver: Side,
}

impl GameState {
    /// A first-quarter state with the clock full and Home on its own 25.
    #[must_use]
    pub fn new(quarter_seconds: u16) -> Self {
        Self {
            quarter: 1,
            clock: quarter_seconds,
            down: 1,
            to_go: SERIES_YARDS,
            ball_on: 25,
            possession: Side::Home,
            score: Score::default(),
            flags: GameFlags::empty(),
            second_half_receiver: Side::Away,
        }
    }

    /// The side without the ball.
    #[must_use]
    pub const fn defense(&self) -> Side {
        self.possession.opposite()
    }

    /// Line of scrimmage in the offense frame.
    #[must_use]
    pub const fn los(&self) -> u8 {
        self.possession.frame(self.ball_on)
    }

    /// Places the ball at an offense-frame yard line, clamped to the field.
    pub fn set_los(&mut self, frame: u8) {
        self.ball_on = self.possession.absolute(frame.min(100));
    }

    /// Yards between the ball and the goal the offense attacks.
    #[must_use]
    pub const fn yards_to_goal(&self) -> u8 {
        100 - self.los()
    }

    /// Whether the line to gain is the goal line.
    #[must_use]
    pub const fn is_goal_to_go(&self) -> bool {
        self.to_go >= self.yards_to_goal()
    }

    /// Hands the ball to `side` at an offense-frame spot with a fresh series.
    pub fn new_series(&mut self, side: Side, frame: u8) {
        self.possession = side;
        self.set_los(frame);
        self.first_down();
    }

    /// Resets to first down at the current spot.
    pub fn first_down(&mut self) {
        self.down = 1;
        self.to_go = SERIES_YARDS.min(self.yards_to_goal()).max(1);
    }

    /// Whether the next call is a conversion try.
    #[must_use]
    pub fn awaiting_pat(&self) -> bool {
        self.flags.contains(GameFlags::AWAITING_PAT)
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.flags.contains(GameFlags::GAME_OVER)
    }

    /// Whether the current period is overtime.
    #[must_use]
    pub const fn is_overtime(&self) -> bool {
        self.quarter >= OVERTIME_PERIOD
    }

    /// Whether the current period ends a half (second or fourth quarter).
    #[must_use]
    pub const fn ends_half(&self) -> bool {
        matches!(self.quarter, 2 | 4)
    }

    /// Lists every violated structural invariant. Empty when consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.ball_on > 100 {
            problems.push(format!("ball_on {} outside 0..=100", self.ball_on));
        }
        if !(1..=4).contains(&self.down) {
            problems.push(format!("down {} outside 1..=4", self.down));
        }
        if !(1..=OVERTIME_PERIOD).contains(&self.quarter) {
            problems.push(format!("quarter {} outside 1..={OVERTIME_PERIOD}", self.quarter));
        }
        if self.flags.contains(GameFlags::AWAITING_PAT | GameFlags::GAME_OVER) {
            problems.push("awaiting a conversion try after the game ended".to_string());
        }
        if !self.is_over() && !self.awaiting_pat() {
            if self.to_go == 0 {
                problems.push("to_go is 0".to_string());
            }
            if self.to_go > self.yards_to_goal() {
                problems.push(format!(
                    "to_go {} exceeds yards to goal {}",
                    self.to_go,
                    self.yards_to_goal()
                ));
            }
        }
        problems
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let los = self.los();
        let spot = if los > 50 {
            format!("opp {}", 100 - los)
        } else {
            format!("own {los}")
        };
        write!(
            f,
            "Q{} {}:{:02} | {} ball, {} & {} at {} | {}",
            self.quarter,
            self.clock / 60,
            self.clock % 60,
            self.possession,
            self.down,
            if self.is_goal_to_go() {
                "goal".to_string()
            } else {
                self.to_go.to_string()
            },
            spot,
            self.score
        )
    }
}
