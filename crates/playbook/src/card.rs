//! Play-card catalogs.
//!
//! Cards are immutable catalog entries owned by the data layer. The engine
//! only reads their id, label, category and restrictions.
//!
//! A catalog holds one or more offensive decks plus the shared defensive
//! cards. Each offensive card remembers the deck it came from so the chart
//! resolver can address `(deck, play label, defense letter)` cells.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{read_file, TableError};
use crate::validation::ValidationReport;

/// Offensive card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffenseCategory {
    /// Running play.
    Run,
    /// Passing play.
    Pass,
    /// Punt. Bypasses the outcome tables.
    Punt,
    /// Place kick: field goal, or the kick after a touchdown.
    FieldGoal,
}

impl OffenseCategory {
    /// Whether this is a scrimmage play resolved through the outcome tables.
    #[must_use]
    pub const fn is_scrimmage(self) -> bool {
        matches!(self, Self::Run | Self::Pass)
    }
}

impl fmt::Display for OffenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Pass => write!(f, "pass"),
            Self::Punt => write!(f, "punt"),
            Self::FieldGoal => write!(f, "field goal"),
        }
    }
}

/// Defensive card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseCategory {
    /// Geared against the run.
    Run,
    /// Geared against the pass.
    Pass,
    /// Neither.
    Balanced,
}

/// An offensive play card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffenseCard {
    /// Unique card id.
    pub id: String,
    /// Play label, also the chart row name.
    pub label: String,
    /// Card category.
    pub category: OffenseCategory,
    /// Downs on which the card may be called. Empty means any down.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub downs: Vec<u8>,
    /// Goal-line restriction: the card is illegal when the offense is this
    /// many yards or fewer from the opponent's goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_inside: Option<u8>,
    /// Deck the card belongs to. Filled in by the catalog loader.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deck: String,
}

impl OffenseCard {
    /// Creates an unrestricted card.
    #[must_use]
    pub fn new(id: &str, label: &str, category: OffenseCategory) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            category,
            downs: Vec::new(),
            blocked_inside: None,
            deck: String::new(),
        }
    }

    /// Whether the card may be called on `down`.
    #[must_use]
    pub fn allowed_on_down(&self, down: u8) -> bool {
        self.downs.is_empty() || self.downs.contains(&down)
    }

    /// Whether the goal-line restriction blocks the card at `yards_to_goal`.
    #[must_use]
    pub fn blocked_at(&self, yards_to_goal: u8) -> bool {
        self.blocked_inside
            .is_some_and(|limit| yards_to_goal <= limit)
    }
}

/// A defensive play card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefenseCard {
    /// Unique card id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Chart column letter.
    pub letter: char,
    /// Card category.
    pub category: DefenseCategory,
}

impl DefenseCard {
    /// Creates a defensive card.
    #[must_use]
    pub fn new(id: &str, label: &str, letter: char, category: DefenseCategory) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            letter,
            category,
        }
    }
}

/// A named offensive deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck name, also the chart section name.
    pub name: String,
    /// Cards in the deck.
    pub cards: Vec<OffenseCard>,
}

impl Deck {
    /// Cards of one category, in catalog order.
    pub fn cards_in(&self, category: OffenseCategory) -> impl Iterator<Item = &OffenseCard> {
        self.cards.iter().filter(move |card| card.category == category)
    }

    /// The first card of a category, if any.
    #[must_use]
    pub fn first_of(&self, category: OffenseCategory) -> Option<&OffenseCard> {
        self.cards_in(category).next()
    }
}

/// Offensive decks plus defensive cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCatalog {
    /// Offensive decks.
    pub decks: Vec<Deck>,
    /// Defensive cards, shared by every side.
    pub defense: Vec<DefenseCard>,
}

impl CardCatalog {
    /// Parses and validates a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Json`] for malformed JSON and
    /// [`TableError::Invalid`] when ids or letters collide or a deck is empty.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let mut catalog: Self = serde_json::from_str(json)?;
        for deck in &mut catalog.decks {
            for card in &mut deck.cards {
                card.deck.clone_from(&deck.name);
            }
        }
        let report = catalog.validate();
        if report.has_errors() {
            return Err(TableError::Invalid(report));
        }
        report.log_warnings("catalog");
        Ok(catalog)
    }

    /// Reads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// See [`CardCatalog::from_json_str`]; also fails on I/O errors.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::from_json_str(&read_file(path)?)
    }

    /// Checks id uniqueness, letter uniqueness and deck contents.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        if self.decks.is_empty() {
            report.error("decks", "catalog has no offensive decks");
        }
        if self.defense.is_empty() {
            report.error("defense", "catalog has no defensive cards");
        }

        let mut ids = HashSet::new();
        for (d, deck) in self.decks.iter().enumerate() {
            if deck.cards.is_empty() {
                report.error(format!("decks[{d}]"), format!("deck `{}` is empty", deck.name));
            }
            for (c, card) in deck.cards.iter().enumerate() {
                if !ids.insert(card.id.as_str()) {
                    report.error(
                        format!("decks[{d}].cards[{c}]"),
                        format!("duplicate card id `{}`", card.id),
                    );
                }
                if card.downs.iter().any(|down| !(1..=4).contains(down)) {
                    report.error(
                        format!("decks[{d}].cards[{c}].downs"),
                        "downs must be between 1 and 4",
                    );
                }
            }
            if deck.first_of(OffenseCategory::Punt).is_none() {
                report.warn(format!("decks[{d}]"), "deck has no punt card");
            }
            if deck.first_of(OffenseCategory::FieldGoal).is_none() {
                report.warn(format!("decks[{d}]"), "deck has no field goal card");
            }
        }

        let mut letters = HashSet::new();
        for (i, card) in self.defense.iter().enumerate() {
            if !ids.insert(card.id.as_str()) {
                report.error(format!("defense[{i}]"), format!("duplicate card id `{}`", card.id));
            }
            if !card.letter.is_ascii_uppercase() {
                report.error(
                    format!("defense[{i}].letter"),
                    format!("letter `{}` is not A-Z", card.letter),
                );
            }
            if !letters.insert(card.letter) {
                report.error(
                    format!("defense[{i}].letter"),
                    format!("duplicate letter `{}`", card.letter),
                );
            }
        }
        report
    }

    /// Looks up a deck by name.
    #[must_use]
    pub fn deck(&self, name: &str) -> Option<&Deck> {
        self.decks.iter().find(|deck| deck.name == name)
    }

    /// Looks up an offensive card by id across all decks.
    #[must_use]
    pub fn offense_card(&self, id: &str) -> Option<&OffenseCard> {
        self.decks
            .iter()
            .flat_map(|deck| deck.cards.iter())
            .find(|card| card.id == id)
    }

    /// Looks up a defensive card by id.
    #[must_use]
    pub fn defense_card(&self, id: &str) -> Option<&DefenseCard> {
        self.defense.iter().find(|card| card.id == id)
    }

    /// Looks up a defensive card by label.
    #[must_use]
    pub fn defense_by_label(&self, label: &str) -> Option<&DefenseCard> {
        self.defense.iter().find(|card| card.label == label)
    }

    /// Defensive cards of one category.
    pub fn defense_in(&self, category: DefenseCategory) -> impl Iterator<Item = &DefenseCard> {
        self.defense.iter().filter(move |card| card.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "decks": [{
            "name": "Test",
            "cards": [
                {"id": "t-run", "label": "Dive", "category": "run"},
                {"id": "t-rev", "label": "Reverse", "category": "run", "blocked_inside": 10},
                {"id": "t-punt", "label": "Punt", "category": "punt", "downs": [4]},
                {"id": "t-fg", "label": "Field Goal", "category": "field_goal"}
            ]
        }],
        "defense": [
            {"id": "d-a", "label": "Goal Line", "letter": "A", "category": "run"},
            {"id": "d-b", "label": "Zone", "letter": "B", "category": "pass"}
        ]
    }"#;

    #[test]
    fn loads_and_stamps_deck_names() {
        let catalog = CardCatalog::from_json_str(CATALOG).unwrap();
        let card = catalog.offense_card("t-rev").unwrap();
        assert_eq!(card.deck, "Test");
        assert_eq!(catalog.defense_by_label("Zone").unwrap().letter, 'B');
        assert_eq!(catalog.deck("Test").unwrap().cards_in(OffenseCategory::Run).count(), 2);
    }

    #[test]
    fn restrictions_apply() {
        let catalog = CardCatalog::from_json_str(CATALOG).unwrap();
        let punt = catalog.offense_card("t-punt").unwrap();
        assert!(punt.allowed_on_down(4));
        assert!(!punt.allowed_on_down(3));

        let reverse = catalog.offense_card("t-rev").unwrap();
        assert!(reverse.blocked_at(10));
        assert!(reverse.blocked_at(3));
        assert!(!reverse.blocked_at(11));
        assert!(!catalog.offense_card("t-run").unwrap().blocked_at(1));
    }

    #[test]
    fn duplicate_ids_and_letters_are_rejected_together() {
        let json = r#"{
            "decks": [{"name": "X", "cards": [
                {"id": "dup", "label": "A", "category": "run"},
                {"id": "dup", "label": "B", "category": "pass", "downs": [5]}
            ]}],
            "defense": [
                {"id": "d1", "label": "One", "letter": "A", "category": "run"},
                {"id": "d2", "label": "Two", "letter": "A", "category": "pass"}
            ]
        }"#;
        let err = CardCatalog::from_json_str(json).unwrap_err();
        let report = err.report().unwrap();
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            CardCatalog::from_json_str("{"),
            Err(TableError::Json(_))
        ));
    }
}
