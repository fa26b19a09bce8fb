//! Coach profiles.

use serde::{Deserialize, Serialize};

/// Tendencies of a computer coach. Every field is in `0..=1`, with 0.5 as
/// neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachProfile {
    /// Profile name.
    pub name: String,
    /// General risk appetite.
    pub aggression: f64,
    /// Lean toward passing.
    pub pass_bias: f64,
    /// Willingness to go for it on fourth down.
    pub fourth_down_boldness: f64,
    /// Willingness to try onside kicks.
    pub onside_aggression: f64,
    /// Willingness to go for two late in the game.
    pub two_point_aggression: f64,
}

impl Default for CoachProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

impl CoachProfile {
    /// Plays the percentages, punts readily, kicks the extra point.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            name: "conservative".to_string(),
            aggression: 0.2,
            pass_bias: 0.4,
            fourth_down_boldness: 0.2,
            onside_aggression: 0.2,
            two_point_aggression: 0.2,
        }
    }

    /// Neutral tendencies.
    #[must_use]
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            aggression: 0.5,
            pass_bias: 0.5,
            fourth_down_boldness: 0.5,
            onside_aggression: 0.5,
            two_point_aggression: 0.5,
        }
    }

    /// Throws more, goes for it more.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            name: "aggressive".to_string(),
            aggression: 0.85,
            pass_bias: 0.65,
            fourth_down_boldness: 0.8,
            onside_aggression: 0.9,
            two_point_aggression: 0.8,
        }
    }

    /// Looks up a preset by name.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "conservative" => Some(Self::conservative()),
            "balanced" => Some(Self::balanced()),
            "aggressive" => Some(Self::aggressive()),
            _ => None,
        }
    }
}
