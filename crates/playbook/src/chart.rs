//! Free-text result charts.
//!
//! A chart maps `(deck, play label, defense letter)` to a printed result such
//! as `"Complete +13 O/B"` or `"Penalty Def 5; +3"`. Cells are parsed exactly
//! once, when the chart is loaded, into [`OutcomeRecord`]s. Play resolution
//! only ever performs lookups.
//!
//! # Grammar
//!
//! Matching is case-insensitive and whitespace-tolerant.
//!
//! | Cell text | Result |
//! |---|---|
//! | `+N`, `N`, `Gain N`, `Complete +N`, `Run N` | `Gain` |
//! | `-N`, `Loss N`, `Sack -N`, `Complete -N` | `Loss` |
//! | `No Gain` | `Gain(0)` |
//! | `Incomplete`, `Inc` | `Incomplete` |
//! | `Fumble` | `Fumble` |
//! | `Intercepted N[, return M]`, `Int N [R M]` | `Interception` |
//! | `Long Gain`, `LG` | `LongGain` (rolled at play time) |
//! | `TD`, `Touchdown` | offensive `Touchdown` |
//! | `Penalty Off\|Def N [Auto] [; result]` | `Penalty` |
//!
//! A trailing `O/B`, `OB` or `OOB` marks the play out of bounds.
//!
//! Cells that do not match are kept as `Other` with a load warning, so the
//! chart still loads and the play degrades to a neutral result.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::card::CardCatalog;
use crate::error::{read_file, ChartParseError, TableError};
use crate::outcome::{OutcomeKind, OutcomeRecord, PenaltyCall, Squad};
use crate::validation::{ValidationIssue, ValidationReport};

/// Largest yardage a cell may print.
const MAX_CELL_YARDS: u32 = 99;

/// Parses one chart cell.
///
/// # Errors
///
/// Returns [`ChartParseError`] when the text does not match the grammar.
///
/// # Example
///
/// ```
/// use playbook::chart::parse_cell;
/// use playbook::outcome::OutcomeKind;
///
/// let record = parse_cell("Complete +13 O/B").unwrap();
/// assert_eq!(record.kind, OutcomeKind::Gain { yards: 13 });
/// assert!(record.out_of_bounds);
/// ```
pub fn parse_cell(text: &str) -> Result<OutcomeRecord, ChartParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ChartParseError::new(text, "empty cell"));
    }
    let lower = trimmed.to_ascii_lowercase();
    let (body, out_of_bounds) = strip_out_of_bounds(&lower);
    let kind = parse_kind(body, true).map_err(|reason| ChartParseError::new(text, reason))?;
    Ok(OutcomeRecord::new(kind)
        .with_out_of_bounds(out_of_bounds)
        .with_source(trimmed))
}

fn strip_out_of_bounds(text: &str) -> (&str, bool) {
    for suffix in [" o/b", " oob", " ob"] {
        if let Some(body) = text.strip_suffix(suffix) {
            return (body.trim_end(), true);
        }
    }
    (text, false)
}

fn parse_kind(body: &str, allow_penalty: bool) -> Result<OutcomeKind, String> {
    let body = body.trim();
    match body {
        "incomplete" | "inc" | "incomplete pass" => return Ok(OutcomeKind::Incomplete),
        "fumble" | "fumble lost" => return Ok(OutcomeKind::Fumble),
        "long gain" | "lg" => return Ok(OutcomeKind::LongGain { yards: 0 }),
        "td" | "touchdown" => return Ok(OutcomeKind::Touchdown { by: Squad::Offense }),
        "no gain" => return Ok(OutcomeKind::Gain { yards: 0 }),
        _ => {}
    }

    if let Some(rest) = body.strip_prefix("penalty") {
        if !allow_penalty {
            return Err("nested penalty".to_string());
        }
        return parse_penalty(rest);
    }
    if let Some(rest) = strip_word(body, &["intercepted", "interception", "int"]) {
        return parse_interception(rest);
    }
    if let Some(rest) = strip_word(body, &["loss", "sack"]) {
        let yards = parse_magnitude(rest)?;
        return Ok(OutcomeKind::Loss { yards });
    }
    let rest = strip_word(body, &["complete", "gain", "run"]).unwrap_or(body);
    parse_signed_yards(rest)
}

/// Strips a leading keyword followed by whitespace or end of text.
fn strip_word<'a>(text: &'a str, words: &[&str]) -> Option<&'a str> {
    words.iter().find_map(|word| {
        let rest = text.strip_prefix(word)?;
        (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim_start())
    })
}

fn parse_number(token: &str) -> Result<i32, String> {
    token
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("expected yardage, found `{}`", token.trim()))
}

fn to_yards(value: u32) -> Result<u8, String> {
    if value > MAX_CELL_YARDS {
        return Err(format!("yardage {value} exceeds {MAX_CELL_YARDS}"));
    }
    u8::try_from(value).map_err(|_| format!("yardage {value} out of range"))
}

fn parse_magnitude(text: &str) -> Result<u8, String> {
    to_yards(parse_number(text)?.unsigned_abs())
}

fn parse_signed_yards(text: &str) -> Result<OutcomeKind, String> {
    let value = parse_number(text)?;
    let yards = to_yards(value.unsigned_abs())?;
    if value < 0 {
        Ok(OutcomeKind::Loss { yards })
    } else {
        Ok(OutcomeKind::Gain { yards })
    }
}

fn parse_interception(rest: &str) -> Result<OutcomeKind, String> {
    let normalized = rest.replace(',', " ");
    let mut tokens = normalized.split_whitespace();
    let air_yards = match tokens.next() {
        Some(token) => parse_magnitude(token)?,
        None => 0,
    };
    let return_yards = match tokens.next() {
        None => 0,
        Some("return" | "ret" | "r") => {
            let token = tokens
                .next()
                .ok_or_else(|| "missing return yardage".to_string())?;
            parse_magnitude(token)?
        }
        Some(other) => return Err(format!("unexpected `{other}` after interception depth")),
    };
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected `{extra}` after interception return"));
    }
    Ok(OutcomeKind::Interception {
        air_yards,
        return_yards,
    })
}

fn parse_penalty(rest: &str) -> Result<OutcomeKind, String> {
    let rest = rest.trim_start_matches(':').trim();
    let (head, tail) = match rest.split_once(';') {
        Some((head, tail)) => (head, Some(tail)),
        None => (rest, None),
    };

    let mut tokens = head.split_whitespace();
    let on = match tokens.next() {
        Some("off" | "offense" | "o") => Squad::Offense,
        Some("def" | "defense" | "d") => Squad::Defense,
        Some(other) => return Err(format!("unknown penalized side `{other}`")),
        None => return Err("penalty without side".to_string()),
    };
    let yards = match tokens.next() {
        Some(token) => parse_magnitude(token)?,
        None => return Err("penalty without yardage".to_string()),
    };
    let mut call = PenaltyCall::new(on, yards);
    for token in tokens {
        match token {
            "auto" | "automatic" | "1st" | "first" => call.automatic_first_down = true,
            other => return Err(format!("unexpected `{other}` in penalty")),
        }
    }
    if let Some(tail) = tail {
        let play = parse_kind(tail, false)?;
        call = call.with_play(play);
    }
    Ok(OutcomeKind::Penalty(call))
}

#[derive(Debug, Deserialize)]
struct RawChart {
    version: String,
    decks: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
}

type DeckCells = BTreeMap<String, BTreeMap<char, OutcomeRecord>>;

/// A parsed, validated result chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    version: String,
    decks: BTreeMap<String, DeckCells>,
    warnings: Vec<ValidationIssue>,
}

impl Chart {
    /// Parses and validates a chart from JSON.
    ///
    /// The expected shape is
    /// `{"version": "...", "decks": {deck: {play: {letter: text}}}}`.
    ///
    /// # Errors
    ///
    /// [`TableError::Invalid`] when the version is empty, there are no decks
    /// or a column key is not a single letter. Unparseable cells are only
    /// warnings.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let raw: RawChart = serde_json::from_str(json)?;
        let mut report = ValidationReport::new();
        if raw.version.trim().is_empty() {
            report.error("version", "chart version is empty");
        }
        if raw.decks.is_empty() {
            report.error("decks", "chart has no decks");
        }

        let mut decks = BTreeMap::new();
        for (deck_name, plays) in raw.decks {
            let mut rows = BTreeMap::new();
            for (play, columns) in plays {
                let mut row = BTreeMap::new();
                for (key, text) in columns {
                    let path = format!("decks.{deck_name}.{play}.{key}");
                    let Some(letter) = single_letter(&key) else {
                        report.error(path, format!("column `{key}` is not a single letter"));
                        continue;
                    };
                    let record = parse_cell(&text).unwrap_or_else(|err| {
                        report.warn(&path, err.to_string());
                        OutcomeRecord::new(OutcomeKind::Other).with_source(text.trim())
                    });
                    row.insert(letter, record);
                }
                rows.insert(play, row);
            }
            decks.insert(deck_name, rows);
        }

        if report.has_errors() {
            return Err(TableError::Invalid(report));
        }
        report.log_warnings("chart");
        Ok(Self {
            version: raw.version,
            decks,
            warnings: report.warnings,
        })
    }

    /// Reads and validates a chart file.
    ///
    /// # Errors
    ///
    /// See [`Chart::from_json_str`]; also fails on I/O errors.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::from_json_str(&read_file(path)?)
    }

    /// Chart version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Warnings recorded while loading.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// Looks up a cell.
    #[must_use]
    pub fn lookup(&self, deck: &str, play: &str, letter: char) -> Option<&OutcomeRecord> {
        self.decks.get(deck)?.get(play)?.get(&letter.to_ascii_uppercase())
    }

    /// Number of parsed cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.decks
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    /// Reports scrimmage cards from `catalog` with missing cells.
    ///
    /// Missing cells are warnings: play resolution falls back to a neutral
    /// result for them.
    #[must_use]
    pub fn check_coverage(&self, catalog: &CardCatalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        for deck in &catalog.decks {
            for card in deck.cards.iter().filter(|card| card.category.is_scrimmage()) {
                for defense in &catalog.defense {
                    if self.lookup(&deck.name, &card.label, defense.letter).is_none() {
                        report.warn(
                            format!("decks.{}.{}.{}", deck.name, card.label, defense.letter),
                            "no chart cell",
                        );
                    }
                }
            }
        }
        report
    }
}

fn single_letter(key: &str) -> Option<char> {
    let mut chars = key.trim().chars();
    let letter = chars.next()?;
    (chars.next().is_none() && letter.is_ascii_alphabetic()).then(|| letter.to_ascii_uppercase())
}
