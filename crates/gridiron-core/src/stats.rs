//! Box-score accumulation from committed events.

use serde::{Deserialize, Serialize};

use playbook::OffenseCategory;

use crate::event::GameEvent;
use crate::state::Side;

/// Running totals for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStats {
    /// Scrimmage plays run, conversion plays included.
    pub plays: u32,
    /// Running plays.
    pub runs: u32,
    /// Passing plays.
    pub passes: u32,
    /// Net scrimmage yards.
    pub yards: i32,
    /// Possessions lost to interceptions, fumbles, downs and missed kicks.
    pub turnovers: u32,
    /// Accepted penalties against this side.
    pub penalties: u32,
    /// Yards enforced against this side.
    pub penalty_yards: u32,
    /// First downs earned.
    pub first_downs: u32,
    /// Touchdowns scored.
    pub touchdowns: u32,
    /// Field goals made.
    pub field_goals: u32,
}

impl SideStats {
    /// Net yards per scrimmage play, 0 when no plays were run.
    #[must_use]
    pub fn yards_per_play(&self) -> f64 {
        if self.plays == 0 {
            0.0
        } else {
            f64::from(self.yards) / f64::from(self.plays)
        }
    }
}

/// Totals for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Home totals.
    pub home: SideStats,
    /// Away totals.
    pub away: SideStats,
}

impl GameStats {
    /// Totals for one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Folds one committed event into the totals.
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Play {
                offense,
                category,
                yards,
                ..
            } => {
                let stats = self.side_mut(*offense);
                stats.plays += 1;
                match category {
                    OffenseCategory::Run => stats.runs += 1,
                    OffenseCategory::Pass => stats.passes += 1,
                    OffenseCategory::Punt | OffenseCategory::FieldGoal => {}
                }
                stats.yards += i32::from(*yards);
            }
            GameEvent::Turnover { from, .. } => self.side_mut(*from).turnovers += 1,
            GameEvent::Penalty {
                on,
                enforced,
                accepted: true,
                ..
            } => {
                let stats = self.side_mut(*on);
                stats.penalties += 1;
                stats.penalty_yards += u32::from(*enforced);
            }
            GameEvent::FirstDown { side } => self.side_mut(*side).first_downs += 1,
            GameEvent::Touchdown { side } => self.side_mut(*side).touchdowns += 1,
            GameEvent::FieldGoal {
                side, good: true, ..
            } => self.side_mut(*side).field_goals += 1,
            _ => {}
        }
    }
}
