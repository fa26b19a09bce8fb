//! Normalized play outcomes.
//!
//! Every outcome lookup, whether it comes from a free-text chart or from a
//! structured dice table, ends up as an [`OutcomeRecord`]: a tagged
//! [`OutcomeKind`] plus the out-of-bounds flag, an optional clock bucket and
//! the raw source text kept for narration.
//!
//! # Invariants
//!
//! - Exactly one [`OutcomeKind`] variant is active per record.
//! - Yard magnitudes are non-negative; direction is carried by the variant
//!   (`Gain` vs `Loss`).
//! - `source` is narration only. Nothing downstream branches on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which unit on the field an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Squad {
    /// The side in possession at the snap.
    Offense,
    /// The side defending at the snap.
    Defense,
}

impl Squad {
    /// Returns the other squad.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Offense => Self::Defense,
            Self::Defense => Self::Offense,
        }
    }
}

impl fmt::Display for Squad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offense => write!(f, "offense"),
            Self::Defense => write!(f, "defense"),
        }
    }
}

/// Clock bucket attached to a dice-table entry.
///
/// When present it replaces the category-based time cost of the play
/// (out-of-bounds still takes precedence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockBucket {
    /// Ten seconds.
    #[serde(rename = "10")]
    Quick,
    /// Twenty seconds.
    #[serde(rename = "20")]
    Short,
    /// Thirty seconds.
    #[serde(rename = "30")]
    Normal,
    /// Forty seconds.
    #[serde(rename = "40")]
    Long,
}

impl ClockBucket {
    /// Seconds consumed by a play in this bucket.
    #[must_use]
    pub const fn seconds(self) -> u16 {
        match self {
            Self::Quick => 10,
            Self::Short => 20,
            Self::Normal => 30,
            Self::Long => 40,
        }
    }
}

/// A penalty flag thrown on a play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyCall {
    /// The penalized squad.
    pub on: Squad,
    /// Nominal penalty yardage, before the half-distance cap.
    pub yards: u8,
    /// Whether an accepted foul grants a first down. Only honored for
    /// defensive fouls.
    pub automatic_first_down: bool,
    /// Short name of the foul, if the table supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The play result that stands if the penalty is declined. `None` means
    /// the foul happened before any result (a dead-ball foul): declining it
    /// leaves a zero-yard play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play: Option<Box<OutcomeKind>>,
}

impl PenaltyCall {
    /// Creates a penalty with no underlying play.
    #[must_use]
    pub fn new(on: Squad, yards: u8) -> Self {
        Self {
            on,
            yards,
            automatic_first_down: false,
            label: None,
            play: None,
        }
    }

    /// Marks the penalty as carrying an automatic first down.
    #[must_use]
    pub fn with_automatic_first_down(mut self) -> Self {
        self.automatic_first_down = true;
        self
    }

    /// Attaches the play result that stands if the penalty is declined.
    #[must_use]
    pub fn with_play(mut self, play: OutcomeKind) -> Self {
        self.play = Some(Box::new(play));
        self
    }

    /// Attaches a foul label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the play that stands if the penalty is declined.
    #[must_use]
    pub fn declined_play(&self) -> OutcomeKind {
        self.play
            .as_deref()
            .cloned()
            .unwrap_or(OutcomeKind::Gain { yards: 0 })
    }

    /// Whether the underlying play was a long gain.
    #[must_use]
    pub fn on_long_gain(&self) -> bool {
        matches!(self.play.as_deref(), Some(OutcomeKind::LongGain { .. }))
    }
}

/// Tagged result of a single scrimmage play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Positive (or zero) yardage.
    Gain {
        /// Yards gained.
        yards: u8,
    },
    /// Yards lost behind the line of scrimmage.
    Loss {
        /// Yards lost.
        yards: u8,
    },
    /// Incomplete forward pass.
    Incomplete,
    /// Lost fumble at the line of scrimmage.
    Fumble,
    /// Interception. The ball is caught `air_yards` past the line of
    /// scrimmage and returned `return_yards` back toward the passer's goal.
    Interception {
        /// Depth of the catch beyond the line of scrimmage.
        air_yards: u8,
        /// Return distance.
        return_yards: u8,
    },
    /// A penalty flag.
    Penalty(PenaltyCall),
    /// Long gain. Stored table cells carry `yards: 0`; the resolver fills in
    /// the rolled distance.
    LongGain {
        /// Yards gained.
        yards: u8,
    },
    /// A forced touchdown (doubles overrides, chart `TD` cells).
    Touchdown {
        /// The scoring squad.
        by: Squad,
    },
    /// Anything the tables could not express. Resolves as a zero-yard play.
    Other,
}

impl OutcomeKind {
    /// Signed yardage the offense gains from this result.
    ///
    /// Turnovers, penalties, incompletions and forced touchdowns report 0;
    /// their field effects are applied by the engine.
    #[must_use]
    pub fn net_yards(&self) -> i16 {
        match self {
            Self::Gain { yards } | Self::LongGain { yards } => i16::from(*yards),
            Self::Loss { yards } => -i16::from(*yards),
            _ => 0,
        }
    }

    /// Whether this result hands the ball to the defense.
    #[must_use]
    pub const fn is_turnover(&self) -> bool {
        matches!(
            self,
            Self::Fumble
                | Self::Interception { .. }
                | Self::Touchdown {
                    by: Squad::Defense
                }
        )
    }

    /// Whether this result is a penalty.
    #[must_use]
    pub const fn is_penalty(&self) -> bool {
        matches!(self, Self::Penalty(_))
    }

    /// Whether this is a long gain still waiting for its distance roll.
    #[must_use]
    pub const fn is_unrolled_long_gain(&self) -> bool {
        matches!(self, Self::LongGain { yards: 0 })
    }
}

/// A normalized outcome plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// The tagged result.
    pub kind: OutcomeKind,
    /// The ball carrier went out of bounds.
    #[serde(default)]
    pub out_of_bounds: bool,
    /// Clock bucket override from a dice table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockBucket>,
    /// Raw table text, for narration.
    #[serde(default)]
    pub source: String,
}

impl OutcomeRecord {
    /// Wraps a kind with default metadata.
    #[must_use]
    pub fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            out_of_bounds: false,
            clock: None,
            source: String::new(),
        }
    }

    /// The neutral zero-yard, no-turnover outcome used when a table has no
    /// usable entry.
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(OutcomeKind::Gain { yards: 0 }).with_source("no gain")
    }

    /// Sets the out-of-bounds flag.
    #[must_use]
    pub fn with_out_of_bounds(mut self, out_of_bounds: bool) -> Self {
        self.out_of_bounds = out_of_bounds;
        self
    }

    /// Sets the clock bucket override.
    #[must_use]
    pub fn with_clock(mut self, clock: Option<ClockBucket>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the narration text.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the record is the neutral fallback shape.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        matches!(self.kind, OutcomeKind::Gain { yards: 0 } | OutcomeKind::Other)
    }
}
