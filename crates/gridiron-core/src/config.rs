//! Engine configuration.
//!
//! Every rule constant that a designer might want to tune lives here as a
//! named field with a default. Configs load from JSON; omitted fields keep
//! their defaults.
//!
//! ```
//! use gridiron_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{"quarter_seconds": 600}"#).unwrap();
//! assert_eq!(config.quarter_seconds, 600);
//! assert_eq!(config.two_minute_threshold, 120);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Seconds charged per play category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOffTable {
    /// Incomplete pass.
    pub incomplete: u16,
    /// Interception.
    pub interception: u16,
    /// Lost fumble.
    pub fumble: u16,
    /// Accepted penalty.
    pub penalty: u16,
    /// Loss of yardage.
    pub loss: u16,
    /// Gain below the long-gain threshold.
    pub gain_short: u16,
    /// Gain at or above the long-gain threshold.
    pub gain_long: u16,
    /// Ball carrier out of bounds. Overrides every other category.
    pub out_of_bounds: u16,
    /// Kickoff.
    pub kickoff: u16,
    /// Punt.
    pub punt: u16,
    /// Field goal attempt.
    pub field_goal: u16,
    /// Conversion try.
    pub extra_point: u16,
    /// Gains of at least this many yards are charged as long.
    pub long_gain_yards: u8,
}

impl Default for TimeOffTable {
    fn default() -> Self {
        Self {
            incomplete: 10,
            interception: 20,
            fumble: 20,
            penalty: 10,
            loss: 30,
            gain_short: 30,
            gain_long: 40,
            out_of_bounds: 15,
            kickoff: 10,
            punt: 15,
            field_goal: 10,
            extra_point: 0,
            long_gain_yards: 15,
        }
    }
}

/// Sudden-death overtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertimeRules {
    /// Length of the overtime period.
    pub period_seconds: u16,
}

impl Default for OvertimeRules {
    fn default() -> Self {
        Self {
            period_seconds: 600,
        }
    }
}

/// Situational thresholds used by the computer coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiThresholds {
    /// Yards to goal at or inside which the offense is in the red zone.
    pub red_zone: u8,
    /// Longest field goal the computer will try.
    pub fg_max_attempt: u8,
    /// Smallest deficit that triggers a late onside kick.
    pub onside_min_deficit: u8,
    /// Largest deficit that triggers a late onside kick.
    pub onside_max_deficit: u8,
    /// Fourth-quarter seconds at or below which a late onside kick is tried.
    pub onside_seconds: u16,
    /// Fourth-quarter seconds at or below which the game counts as late.
    pub late_game_seconds: u16,
    /// No punts at or inside this many yards from the opponent goal.
    pub punt_suppress_inside: u8,
    /// Aggression at or above which the coach goes for it near midfield.
    pub aggressive_midfield: f64,
    /// Probability that the defense reads the situation instead of guessing.
    pub defense_read_rate: f64,
    /// Post-touchdown margins at which a two-point try is preferred.
    pub two_point_margins: Vec<i32>,
    /// Fourth-down go-for-it weights.
    pub fourth_down: FourthDownWeights,
}

impl Default for AiThresholds {
    fn default() -> Self {
        Self {
            red_zone: 20,
            fg_max_attempt: 52,
            onside_min_deficit: 4,
            onside_max_deficit: 8,
            onside_seconds: 180,
            late_game_seconds: 300,
            punt_suppress_inside: 35,
            aggressive_midfield: 0.8,
            defense_read_rate: 0.7,
            two_point_margins: vec![-2, -5, -10, 1, 5],
            fourth_down: FourthDownWeights::default(),
        }
    }
}

/// Linear weights of the fourth-down go-for-it score. The coach goes for it
/// when the weighted sum is positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FourthDownWeights {
    /// Constant term.
    pub base: f64,
    /// Per yard to go.
    pub per_yard: f64,
    /// Bonus for two yards or fewer.
    pub short_yardage: f64,
    /// Multiplier on `fourth_down_boldness - 0.5`.
    pub boldness: f64,
    /// Bonus when trailing late in the game.
    pub trailing_late: f64,
    /// Bonus past midfield.
    pub opponent_territory: f64,
}

impl Default for FourthDownWeights {
    fn default() -> Self {
        Self {
            base: -1.0,
            per_yard: -0.6,
            short_yardage: 1.0,
            boldness: 2.0,
            trailing_late: 2.5,
            opponent_territory: 0.8,
        }
    }
}

/// Rule constants for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of each quarter.
    pub quarter_seconds: u16,
    /// Clock reading that triggers the two-minute warning.
    pub two_minute_threshold: u16,
    /// Seconds charged per play category.
    pub time_off: TimeOffTable,
    /// Receiving-frame spot after a touchback.
    pub touchback_spot: u8,
    /// Receiving-frame spot after offsetting kickoff markers.
    pub kickoff_offset_spot: u8,
    /// Yards from the goal line for a conversion try.
    pub pat_spot: u8,
    /// Longest legal field goal attempt.
    pub max_field_goal: u8,
    /// Yards a safety free kick moves the receiver upfield.
    pub free_kick_bonus: u8,
    /// Farthest receiving-frame spot after a free kick.
    pub free_kick_cap: u8,
    /// Kicking-frame spot of a free-kick punt.
    pub free_kick_punt_spot: u8,
    /// Overtime rules. `None` lets regulation end tied.
    pub overtime: Option<OvertimeRules>,
    /// Computer coach thresholds.
    pub ai: AiThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quarter_seconds: 900,
            two_minute_threshold: 120,
            time_off: TimeOffTable::default(),
            touchback_spot: 20,
            kickoff_offset_spot: 25,
            pat_spot: 2,
            max_field_goal: 55,
            free_kick_bonus: 15,
            free_kick_cap: 50,
            free_kick_punt_spot: 20,
            overtime: None,
            ai: AiThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a config from JSON.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for malformed input, [`ConfigError::Invalid`]
    /// listing every out-of-range field.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::from_json_str`]; also fails on I/O errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Enables overtime with default rules.
    #[must_use]
    pub fn with_overtime(mut self) -> Self {
        self.overtime = Some(OvertimeRules::default());
        self
    }

    /// Checks every field range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] listing all problems found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.quarter_seconds == 0 {
            problems.push("quarter_seconds must be positive".to_string());
        }
        if self.two_minute_threshold >= self.quarter_seconds {
            problems.push("two_minute_threshold must be below quarter_seconds".to_string());
        }
        for (name, spot) in [
            ("touchback_spot", self.touchback_spot),
            ("kickoff_offset_spot", self.kickoff_offset_spot),
            ("free_kick_cap", self.free_kick_cap),
            ("free_kick_punt_spot", self.free_kick_punt_spot),
        ] {
            if !(1..=50).contains(&spot) {
                problems.push(format!("{name} must be within 1..=50"));
            }
        }
        if !(1..=15).contains(&self.pat_spot) {
            problems.push("pat_spot must be within 1..=15".to_string());
        }
        if self.max_field_goal < 18 {
            problems.push("max_field_goal must allow at least an 18-yard kick".to_string());
        }
        if let Some(overtime) = &self.overtime {
            if overtime.period_seconds == 0 {
                problems.push("overtime.period_seconds must be positive".to_string());
            }
        }
        let ai = &self.ai;
        if ai.onside_min_deficit > ai.onside_max_deficit {
            problems.push("ai.onside_min_deficit exceeds ai.onside_max_deficit".to_string());
        }
        if !(0.0..=1.0).contains(&ai.defense_read_rate) {
            problems.push("ai.defense_read_rate must be within 0..=1".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}
