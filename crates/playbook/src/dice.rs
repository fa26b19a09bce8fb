//! Dice and random sources.
//!
//! Everything random in a game flows through a [`RandomSource`], one die at a
//! time. Draw order is part of the replay contract: the same source seeded
//! the same way, asked for the same dice in the same order, yields the same
//! game.
//!
//! - [`SeededDice`] wraps `ChaCha8Rng` for real play and batch simulation.
//! - [`ScriptedDice`] replays a fixed face sequence, for scenario tests and
//!   recorded-game replays.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A source of uniform die faces.
pub trait RandomSource: Send {
    /// Rolls one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u8) -> u8;

    /// Rolls two identical dice.
    fn roll_pair(&mut self, sides: u8) -> Roll {
        let first = self.roll_die(sides);
        let second = self.roll_die(sides);
        Roll::new(first, second)
    }

    /// Rolls `2d6` and returns the sum.
    fn roll_2d6(&mut self) -> u8 {
        self.roll_pair(6).sum()
    }

    /// Rolls a percentile die (`1..=100`).
    fn percent(&mut self) -> u8 {
        self.roll_die(100)
    }

    /// Returns `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        let threshold = (p.clamp(0.0, 1.0) * 100.0).round();
        f64::from(self.percent()) <= threshold
    }

    /// Picks a uniformly random index below `len`. Returns 0 for `len <= 1`.
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let sides = u8::try_from(len).unwrap_or(u8::MAX);
        usize::from(self.roll_die(sides) - 1)
    }
}

/// Number and size of dice a table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceSpec {
    /// Number of dice.
    pub count: u8,
    /// Faces per die.
    pub sides: u8,
}

impl DiceSpec {
    /// Two twenty-sided dice, the matchup-table dice.
    pub const TWO_D20: Self = Self::new(2, 20);
    /// Two six-sided dice, the special-teams dice.
    pub const TWO_D6: Self = Self::new(2, 6);

    /// Creates a dice spec.
    #[must_use]
    pub const fn new(count: u8, sides: u8) -> Self {
        Self { count, sides }
    }

    /// Smallest possible sum.
    #[must_use]
    pub const fn min_sum(self) -> u8 {
        self.count
    }

    /// Largest possible sum.
    #[must_use]
    pub const fn max_sum(self) -> u8 {
        self.count.saturating_mul(self.sides)
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// The faces of a two-dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roll {
    faces: [u8; 2],
}

impl Roll {
    /// Creates a roll from two faces.
    #[must_use]
    pub const fn new(first: u8, second: u8) -> Self {
        Self {
            faces: [first, second],
        }
    }

    /// Both faces.
    #[must_use]
    pub const fn faces(self) -> [u8; 2] {
        self.faces
    }

    /// Sum of the faces.
    #[must_use]
    pub const fn sum(self) -> u8 {
        self.faces[0] + self.faces[1]
    }

    /// Whether both dice show the same face.
    #[must_use]
    pub const fn is_doubles(self) -> bool {
        self.faces[0] == self.faces[1]
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.faces[0], self.faces[1])
    }
}

/// Seeded `ChaCha8Rng` dice.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededDice {
    /// Creates dice from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed these dice were created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededDice {
    fn roll_die(&mut self, sides: u8) -> u8 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of faces.
///
/// Each requested die consumes the next scripted face, folded into
/// `1..=sides` so a script never produces an impossible face. When the script
/// runs out it starts over from the beginning.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    /// Creates scripted dice.
    #[must_use]
    pub fn new(faces: impl Into<Vec<u8>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: 0,
        }
    }

    /// Number of faces consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Whether every scripted face has been used at least once.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.faces.len()
    }
}

impl RandomSource for ScriptedDice {
    fn roll_die(&mut self, sides: u8) -> u8 {
        let sides = sides.max(1);
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        (face.max(1) - 1) % sides + 1
    }
}
