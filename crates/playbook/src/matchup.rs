//! Structured dice-sum matchup tables.
//!
//! A matchup book holds one table per `(offense card, defense card)` pair.
//! Each table is keyed by the sum of two twenty-sided dice:
//!
//! - Non-doubles sums (3..=39) index the per-sum entries (yards, clock
//!   bucket, tags).
//! - Doubles bypass the entries: 1-1 and 20-20 trigger the table's forced
//!   results (usually a defensive and an offensive touchdown) and 2-2
//!   through 19-19 consult the book-wide penalty sub-table by face.
//!
//! Books are validated in full at load time. Any error rejects the whole
//! book with the aggregated [`ValidationReport`]; the engine never sees a
//! partially valid book.
//!
//! # Example
//!
//! ```
//! use playbook::dice::Roll;
//! use playbook::outcome::OutcomeKind;
//!
//! let book = playbook::data::standard_matchups().unwrap();
//! let record = book.lookup("pro-off-tackle", "def-43-base", Roll::new(9, 12)).unwrap();
//! assert!(!matches!(record.kind, OutcomeKind::Penalty(_)));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::dice::{DiceSpec, Roll};
use crate::error::{read_file, TableError};
use crate::outcome::{ClockBucket, OutcomeKind, OutcomeRecord, PenaltyCall, Squad};
use crate::validation::{ValidationIssue, ValidationReport};

/// Smallest non-doubles sum on 2d20.
pub const MIN_SUM: u8 = 3;
/// Largest non-doubles sum on 2d20.
pub const MAX_SUM: u8 = 39;
/// Faces whose doubles consult the penalty sub-table.
pub const PENALTY_FACES: std::ops::RangeInclusive<u8> = 2..=19;

/// Largest yardage an entry may carry.
const MAX_ENTRY_YARDS: u16 = 99;

/// Tag on a per-sum entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryTag {
    /// Ball carrier ends out of bounds.
    #[serde(rename = "OOB")]
    OutOfBounds,
    /// Incomplete pass.
    Incomplete,
    /// Lost fumble.
    Fumble,
    /// Interception; `yards` is the depth of the catch.
    Interception,
    /// Long gain, distance rolled at play time.
    LongGain,
}

impl EntryTag {
    const fn is_result(self) -> bool {
        !matches!(self, Self::OutOfBounds)
    }

    const fn is_turnover(self) -> bool {
        matches!(self, Self::Fumble | Self::Interception)
    }
}

/// One per-sum entry as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumEntry {
    /// Signed yardage (gain or loss), or interception depth.
    pub yards: i16,
    /// Clock bucket override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockBucket>,
    /// Result tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EntryTag>,
    /// Interception return yardage.
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_yards: Option<u8>,
}

impl SumEntry {
    fn has(&self, tag: EntryTag) -> bool {
        self.tags.contains(&tag)
    }

    fn is_turnover(&self) -> bool {
        self.tags.iter().any(|tag| tag.is_turnover())
    }

    /// Converts the entry into a record, reporting authoring problems.
    fn to_record(&self, sum: u8, path: &str, report: &mut ValidationReport) -> Option<OutcomeRecord> {
        let results: Vec<_> = self.tags.iter().filter(|tag| tag.is_result()).collect();
        if results.len() > 1 {
            report.error(path, format!("conflicting result tags {results:?}"));
            return None;
        }
        let magnitude = self.yards.unsigned_abs();
        if magnitude > MAX_ENTRY_YARDS {
            report.error(path, format!("yardage {} exceeds {MAX_ENTRY_YARDS}", self.yards));
            return None;
        }
        let yards = u8::try_from(magnitude).ok()?;

        let kind = match results.first() {
            Some(EntryTag::Interception) => {
                if self.yards < 0 {
                    report.error(path, "interception depth cannot be negative");
                    return None;
                }
                OutcomeKind::Interception {
                    air_yards: yards,
                    return_yards: self.return_yards.unwrap_or(0),
                }
            }
            Some(EntryTag::Fumble) => OutcomeKind::Fumble,
            Some(EntryTag::Incomplete) => {
                if self.yards != 0 {
                    report.warn(path, "incomplete entry carries yardage; ignored");
                }
                OutcomeKind::Incomplete
            }
            Some(EntryTag::LongGain) => OutcomeKind::LongGain { yards: 0 },
            Some(EntryTag::OutOfBounds) | None if self.yards < 0 => OutcomeKind::Loss { yards },
            Some(EntryTag::OutOfBounds) | None => OutcomeKind::Gain { yards },
        };
        if self.return_yards.is_some() && !self.has(EntryTag::Interception) {
            report.warn(path, "return yardage on a non-interception entry; ignored");
        }

        Some(
            OutcomeRecord::new(kind)
                .with_out_of_bounds(self.has(EntryTag::OutOfBounds))
                .with_clock(self.clock)
                .with_source(format!("sum {sum}")),
        )
    }
}

/// What a doubles roll does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoublesEffect {
    /// The defense scores.
    DefenseTouchdown,
    /// The offense scores.
    OffenseTouchdown,
    /// Consult the penalty sub-table by face.
    Penalty,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawDoubles {
    #[serde(rename = "1")]
    snake_eyes: Option<DoublesEffect>,
    #[serde(rename = "20")]
    boxcars: Option<DoublesEffect>,
    #[serde(rename = "2-19")]
    middle: Option<DoublesEffect>,
}

/// Validated doubles overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Doubles {
    /// Effect of 1-1.
    pub snake_eyes: DoublesEffect,
    /// Effect of 20-20.
    pub boxcars: DoublesEffect,
    /// Effect of 2-2 through 19-19.
    pub middle: DoublesEffect,
}

impl Doubles {
    /// Effect for a doubled face.
    #[must_use]
    pub fn effect(&self, face: u8) -> DoublesEffect {
        match face {
            1 => self.snake_eyes,
            20 => self.boxcars,
            _ => self.middle,
        }
    }

    fn uses_penalties(&self) -> bool {
        [self.snake_eyes, self.boxcars, self.middle].contains(&DoublesEffect::Penalty)
    }
}

/// One band of the penalty sub-table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyBand {
    /// Inclusive face range `[low, high]`.
    pub faces: [u8; 2],
    /// Penalized squad.
    pub on: Squad,
    /// Penalty yardage.
    pub yards: u8,
    /// Automatic first down if accepted.
    #[serde(default)]
    pub automatic_first_down: bool,
    /// Foul name.
    #[serde(default)]
    pub label: String,
}

impl PenaltyBand {
    /// Whether the band covers `face`.
    #[must_use]
    pub fn covers(&self, face: u8) -> bool {
        (self.faces[0]..=self.faces[1]).contains(&face)
    }

    fn to_call(&self) -> PenaltyCall {
        let mut call = PenaltyCall::new(self.on, self.yards);
        call.automatic_first_down = self.automatic_first_down;
        if !self.label.is_empty() {
            call.label = Some(self.label.clone());
        }
        call
    }
}

/// Authoring metadata of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Free-form risk label (`low`, `medium`, `high`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
    /// Gains at or above this many yards count as explosive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explosive_threshold: Option<u8>,
    /// Inclusive sum range whose entries must all be turnovers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover_band: Option<[u8; 2]>,
    /// Expected turnover rate bounds `[low, high]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_turnover_rate: Option<[f64; 2]>,
    /// Expected mean yards per play bounds `[low, high]`. Long gains count at
    /// their rolled distance; every non-yardage result counts zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_yards_per_play: Option<[f64; 2]>,
}

impl TableMeta {
    /// Whether a gain counts as explosive.
    #[must_use]
    pub fn is_explosive(&self, yards: i16) -> bool {
        self.explosive_threshold
            .is_some_and(|threshold| yards >= i16::from(threshold))
    }

    /// Checks observed rates against the declared bounds, returning one
    /// message per violated bound.
    #[must_use]
    pub fn check_bounds(&self, turnover_rate: f64, yards_per_play: f64) -> Vec<String> {
        let mut violations = Vec::new();
        if let Some([low, high]) = self.expected_turnover_rate {
            if !(low..=high).contains(&turnover_rate) {
                violations.push(format!(
                    "turnover rate {turnover_rate:.4} outside [{low}, {high}]"
                ));
            }
        }
        if let Some([low, high]) = self.expected_yards_per_play {
            if !(low..=high).contains(&yards_per_play) {
                violations.push(format!(
                    "yards per play {yards_per_play:.3} outside [{low}, {high}]"
                ));
            }
        }
        violations
    }

    fn validate(&self, path: &str, report: &mut ValidationReport) {
        if let Some([low, high]) = self.expected_turnover_rate {
            if low > high || low < 0.0 || high > 1.0 {
                report.error(
                    format!("{path}.expected_turnover_rate"),
                    format!("invalid rate bounds [{low}, {high}]"),
                );
            }
        }
        if let Some([low, high]) = self.expected_yards_per_play {
            if low > high {
                report.error(
                    format!("{path}.expected_yards_per_play"),
                    format!("bounds out of order [{low}, {high}]"),
                );
            }
        }
        if self.explosive_threshold == Some(0) {
            report.warn(format!("{path}.explosive_threshold"), "threshold of 0 marks every play explosive");
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTable {
    offense: String,
    defense: String,
    entries: BTreeMap<String, SumEntry>,
    #[serde(default)]
    doubles: Option<RawDoubles>,
    #[serde(default)]
    meta: TableMeta,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    version: String,
    dice: DiceSpec,
    #[serde(default)]
    penalties: Vec<PenaltyBand>,
    tables: Vec<RawTable>,
}

/// Turnover rate and mean yardage of a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableRates {
    /// Fraction of rolls that turn the ball over.
    pub turnover_rate: f64,
    /// Mean yards per roll.
    pub yards_per_play: f64,
}

/// A validated table for one card pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupTable {
    offense: String,
    defense: String,
    entries: BTreeMap<u8, OutcomeRecord>,
    doubles: Doubles,
    meta: TableMeta,
}

impl MatchupTable {
    /// Offensive card id.
    #[must_use]
    pub fn offense(&self) -> &str {
        &self.offense
    }

    /// Defensive card id.
    #[must_use]
    pub fn defense(&self) -> &str {
        &self.defense
    }

    /// Table metadata.
    #[must_use]
    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Doubles overrides.
    #[must_use]
    pub fn doubles(&self) -> &Doubles {
        &self.doubles
    }

    /// The entry for a non-doubles sum.
    #[must_use]
    pub fn entry(&self, sum: u8) -> Option<&OutcomeRecord> {
        self.entries.get(&sum)
    }

    /// Exact rates over all 400 rolls.
    ///
    /// Long gains count `long_gain_mean` yards. Penalties, touchdowns,
    /// incompletions, turnovers and missing entries count zero yards.
    #[must_use]
    pub fn expected_rates(&self, penalties: &[PenaltyBand], long_gain_mean: f64) -> TableRates {
        let sides = DiceSpec::TWO_D20.sides;
        let mut turnovers = 0u32;
        let mut rolls = 0u32;
        let mut yards = 0.0;
        for first in 1..=sides {
            for second in 1..=sides {
                rolls += 1;
                let Some(record) = self.lookup(Roll::new(first, second), penalties) else {
                    continue;
                };
                if record.kind.is_turnover() {
                    turnovers += 1;
                } else if record.kind.is_unrolled_long_gain() {
                    yards += long_gain_mean;
                } else {
                    yards += f64::from(record.kind.net_yards());
                }
            }
        }
        TableRates {
            turnover_rate: f64::from(turnovers) / f64::from(rolls),
            yards_per_play: yards / f64::from(rolls),
        }
    }

    /// Resolves a roll against this table. `None` means no entry exists.
    #[must_use]
    pub fn lookup(&self, roll: Roll, penalties: &[PenaltyBand]) -> Option<OutcomeRecord> {
        if !roll.is_doubles() {
            return self.entry(roll.sum()).cloned();
        }
        let face = roll.faces()[0];
        let source = format!("doubles {roll}");
        match self.doubles.effect(face) {
            DoublesEffect::DefenseTouchdown => Some(
                OutcomeRecord::new(OutcomeKind::Touchdown { by: Squad::Defense }).with_source(source),
            ),
            DoublesEffect::OffenseTouchdown => Some(
                OutcomeRecord::new(OutcomeKind::Touchdown { by: Squad::Offense }).with_source(source),
            ),
            DoublesEffect::Penalty => penalties
                .iter()
                .find(|band| band.covers(face))
                .map(|band| OutcomeRecord::new(OutcomeKind::Penalty(band.to_call())).with_source(source)),
        }
    }
}

/// A validated collection of matchup tables.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupBook {
    version: String,
    dice: DiceSpec,
    penalties: Vec<PenaltyBand>,
    tables: BTreeMap<(String, String), MatchupTable>,
    warnings: Vec<ValidationIssue>,
}

impl MatchupBook {
    /// Parses and validates a book from JSON.
    ///
    /// # Errors
    ///
    /// [`TableError::Json`] for malformed JSON, [`TableError::Invalid`] with
    /// every finding when any validation error is present.
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let raw: RawBook = serde_json::from_str(json)?;
        let mut report = ValidationReport::new();

        if raw.version.trim().is_empty() {
            report.error("version", "book version is empty");
        }
        if raw.dice != DiceSpec::TWO_D20 {
            report.error("dice", format!("expected 2d20, found {}", raw.dice));
        }
        if raw.tables.is_empty() {
            report.error("tables", "book has no tables");
        }

        let mut tables = BTreeMap::new();
        let mut needs_penalties = false;
        for (i, table) in raw.tables.into_iter().enumerate() {
            let path = format!("tables[{i}]");
            let key = (table.offense.clone(), table.defense.clone());
            if tables.contains_key(&key) {
                report.error(
                    &path,
                    format!("duplicate table for ({}, {})", key.0, key.1),
                );
                continue;
            }
            if let Some(validated) = validate_table(table, &path, &mut report) {
                needs_penalties |= validated.doubles.uses_penalties();
                tables.insert(key, validated);
            }
        }
        validate_penalties(&raw.penalties, needs_penalties, &mut report);

        if report.has_errors() {
            return Err(TableError::Invalid(report));
        }
        report.log_warnings("matchup book");
        Ok(Self {
            version: raw.version,
            dice: raw.dice,
            penalties: raw.penalties,
            tables,
            warnings: report.warnings,
        })
    }

    /// Reads and validates a book file.
    ///
    /// # Errors
    ///
    /// See [`MatchupBook::from_json_str`]; also fails on I/O errors.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::from_json_str(&read_file(path)?)
    }

    /// Book version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Dice the book is keyed on.
    #[must_use]
    pub fn dice(&self) -> DiceSpec {
        self.dice
    }

    /// Load warnings.
    #[must_use]
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// The penalty sub-table.
    #[must_use]
    pub fn penalties(&self) -> &[PenaltyBand] {
        &self.penalties
    }

    /// The table for a card pairing.
    #[must_use]
    pub fn table(&self, offense: &str, defense: &str) -> Option<&MatchupTable> {
        self.tables.get(&(offense.to_string(), defense.to_string()))
    }

    /// All tables in key order.
    pub fn tables(&self) -> impl Iterator<Item = &MatchupTable> {
        self.tables.values()
    }

    /// Resolves a roll for a card pairing. `None` when the pairing or the
    /// entry is missing.
    #[must_use]
    pub fn lookup(&self, offense: &str, defense: &str, roll: Roll) -> Option<OutcomeRecord> {
        self.table(offense, defense)?.lookup(roll, &self.penalties)
    }
}

fn validate_table(table: RawTable, path: &str, report: &mut ValidationReport) -> Option<MatchupTable> {
    let errors_before = report.errors.len();
    if table.offense.trim().is_empty() {
        report.error(format!("{path}.offense"), "offense card id is empty");
    }
    if table.defense.trim().is_empty() {
        report.error(format!("{path}.defense"), "defense card id is empty");
    }

    let mut entries = BTreeMap::new();
    let mut raw_entries = BTreeMap::new();
    for (key, entry) in &table.entries {
        let entry_path = format!("{path}.entries.{key}");
        let sum = match key.trim().parse::<u8>() {
            Ok(sum) if (MIN_SUM..=MAX_SUM).contains(&sum) => sum,
            _ => {
                report.error(entry_path, format!("sum must be {MIN_SUM}..={MAX_SUM}"));
                continue;
            }
        };
        if let Some(record) = entry.to_record(sum, &entry_path, report) {
            entries.insert(sum, record);
            raw_entries.insert(sum, entry);
        }
    }
    let missing: Vec<u8> = (MIN_SUM..=MAX_SUM)
        .filter(|sum| !table.entries.contains_key(&sum.to_string()))
        .collect();
    if !missing.is_empty() {
        report.warn(
            format!("{path}.entries"),
            format!("no entries for sums {missing:?}; they resolve as no gain"),
        );
    }

    if let Some([low, high]) = table.meta.turnover_band {
        if low > high || low < MIN_SUM || high > MAX_SUM {
            report.error(
                format!("{path}.meta.turnover_band"),
                format!("invalid band [{low}, {high}]"),
            );
        } else {
            for sum in low..=high {
                match raw_entries.get(&sum) {
                    None => report.error(
                        format!("{path}.entries.{sum}"),
                        "missing turnover-band entry",
                    ),
                    Some(entry) if !entry.is_turnover() => report.error(
                        format!("{path}.entries.{sum}"),
                        "turnover-band entry has no FUMBLE or INTERCEPTION tag",
                    ),
                    Some(_) => {}
                }
            }
        }
    }
    table.meta.validate(&format!("{path}.meta"), report);

    let doubles = validate_doubles(table.doubles.as_ref(), path, report);

    if report.errors.len() > errors_before {
        return None;
    }
    Some(MatchupTable {
        offense: table.offense,
        defense: table.defense,
        entries,
        doubles: doubles?,
        meta: table.meta,
    })
}

fn validate_doubles(raw: Option<&RawDoubles>, path: &str, report: &mut ValidationReport) -> Option<Doubles> {
    let Some(raw) = raw else {
        report.error(format!("{path}.doubles"), "doubles block is missing");
        return None;
    };
    let mut require = |effect: Option<DoublesEffect>, key: &str| {
        if effect.is_none() {
            report.error(format!("{path}.doubles.{key}"), "doubles entry is missing");
        }
        effect
    };
    let snake_eyes = require(raw.snake_eyes, "1");
    let boxcars = require(raw.boxcars, "20");
    let middle = require(raw.middle, "2-19");
    Some(Doubles {
        snake_eyes: snake_eyes?,
        boxcars: boxcars?,
        middle: middle?,
    })
}

fn validate_penalties(bands: &[PenaltyBand], required: bool, report: &mut ValidationReport) {
    let mut covered = BTreeSet::new();
    for (i, band) in bands.iter().enumerate() {
        let path = format!("penalties[{i}]");
        let [low, high] = band.faces;
        if low > high || !PENALTY_FACES.contains(&low) || !PENALTY_FACES.contains(&high) {
            report.error(&path, format!("faces [{low}, {high}] outside 2..=19"));
            continue;
        }
        if band.yards == 0 {
            report.warn(&path, "penalty band with 0 yards");
        }
        for face in low..=high {
            if !covered.insert(face) {
                report.error(&path, format!("face {face} is covered by more than one band"));
            }
        }
    }
    if required {
        for face in PENALTY_FACES {
            if !covered.contains(&face) {
                report.error("penalties", format!("no penalty band covers face {face}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_json(entries: &str, doubles: &str, meta: &str, penalties: &str) -> String {
        format!(
            r#"{{
                "version": "t1",
                "dice": {{"count": 2, "sides": 20}},
                "penalties": {penalties},
                "tables": [{{
                    "offense": "o1",
                    "defense": "d1",
                    "entries": {entries},
                    "doubles": {doubles},
                    "meta": {meta}
                }}]
            }}"#
        )
    }

    const FULL_PENALTIES: &str = r#"[
        {"faces": [2, 9], "on": "defense", "yards": 5, "label": "Offside"},
        {"faces": [10, 15], "on": "offense", "yards": 10, "label": "Holding"},
        {"faces": [16, 19], "on": "defense", "yards": 15, "automatic_first_down": true, "label": "Roughing"}
    ]"#;

    const FULL_DOUBLES: &str =
        r#"{"1": "defense_touchdown", "20": "offense_touchdown", "2-19": "penalty"}"#;

    fn full_entries() -> String {
        let body: Vec<String> = (MIN_SUM..=MAX_SUM)
            .map(|sum| match sum {
                3 => r#""3": {"yards": 0, "tags": ["FUMBLE"]}"#.to_string(),
                4 => r#""4": {"yards": 12, "tags": ["INTERCEPTION"], "return": 4}"#.to_string(),
                5 => r#""5": {"yards": 0, "tags": ["INCOMPLETE"], "clock": "10"}"#.to_string(),
                39 => r#""39": {"yards": 0, "tags": ["LONG_GAIN"]}"#.to_string(),
                _ => format!(r#""{sum}": {{"yards": {}, "tags": ["OOB"]}}"#, i16::from(sum) / 3 - 3),
            })
            .collect();
        format!("{{{}}}", body.join(","))
    }

    fn full_book() -> MatchupBook {
        let json = book_json(
            &full_entries(),
            FULL_DOUBLES,
            r#"{"turnover_band": [3, 4], "explosive_threshold": 15}"#,
            FULL_PENALTIES,
        );
        MatchupBook::from_json_str(&json).unwrap()
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn plain_sums_use_entries() {
            let book = full_book();
            let record = book.lookup("o1", "d1", Roll::new(1, 2)).unwrap();
            assert_eq!(record.kind, OutcomeKind::Fumble);

            let record = book.lookup("o1", "d1", Roll::new(3, 1)).unwrap();
            assert_eq!(
                record.kind,
                OutcomeKind::Interception {
                    air_yards: 12,
                    return_yards: 4
                }
            );

            let record = book.lookup("o1", "d1", Roll::new(2, 3)).unwrap();
            assert_eq!(record.kind, OutcomeKind::Incomplete);
            assert_eq!(record.clock, Some(ClockBucket::Quick));

            let record = book.lookup("o1", "d1", Roll::new(10, 20)).unwrap();
            assert_eq!(record.kind, OutcomeKind::Gain { yards: 7 });
            assert!(record.out_of_bounds);
        }

        #[test]
        fn extreme_doubles_force_touchdowns() {
            let book = full_book();
            let low = book.lookup("o1", "d1", Roll::new(1, 1)).unwrap();
            assert_eq!(low.kind, OutcomeKind::Touchdown { by: Squad::Defense });
            let high = book.lookup("o1", "d1", Roll::new(20, 20)).unwrap();
            assert_eq!(high.kind, OutcomeKind::Touchdown { by: Squad::Offense });
        }

        #[test]
        fn middle_doubles_use_penalty_bands() {
            let book = full_book();
            let OutcomeKind::Penalty(call) = book.lookup("o1", "d1", Roll::new(12, 12)).unwrap().kind
            else {
                panic!("expected penalty");
            };
            assert_eq!(call.on, Squad::Offense);
            assert_eq!(call.yards, 10);
            assert_eq!(call.label.as_deref(), Some("Holding"));

            let OutcomeKind::Penalty(call) = book.lookup("o1", "d1", Roll::new(19, 19)).unwrap().kind
            else {
                panic!("expected penalty");
            };
            assert!(call.automatic_first_down);
        }

        #[test]
        fn missing_pairing_is_none() {
            let book = full_book();
            assert!(book.lookup("o2", "d1", Roll::new(4, 5)).is_none());
        }

        #[test]
        fn explosive_threshold() {
            let book = full_book();
            let meta = book.table("o1", "d1").unwrap().meta();
            assert!(meta.is_explosive(15));
            assert!(!meta.is_explosive(14));
        }
    }

    mod validation_tests {
        use super::*;

        fn errors_of(json: &str) -> Vec<ValidationIssue> {
            match MatchupBook::from_json_str(json) {
                Err(TableError::Invalid(report)) => report.errors,
                other => panic!("expected validation failure, got {other:?}"),
            }
        }

        #[test]
        fn missing_doubles_block_is_an_error() {
            let json = book_json(&full_entries(), "null", "{}", FULL_PENALTIES);
            let errors = errors_of(&json);
            assert!(errors.iter().any(|e| e.path == "tables[0].doubles"));
        }

        #[test]
        fn each_absent_doubles_entry_is_reported() {
            let json = book_json(&full_entries(), r#"{"1": "defense_touchdown"}"#, "{}", FULL_PENALTIES);
            let errors = errors_of(&json);
            assert!(errors.iter().any(|e| e.path == "tables[0].doubles.20"));
            assert!(errors.iter().any(|e| e.path == "tables[0].doubles.2-19"));
        }

        #[test]
        fn turnover_band_requires_turnover_entries() {
            let json = book_json(&full_entries(), FULL_DOUBLES, r#"{"turnover_band": [3, 6]}"#, FULL_PENALTIES);
            let errors = errors_of(&json);
            assert_eq!(
                errors.iter().filter(|e| e.message.contains("turnover-band")).count(),
                2
            );
        }

        #[test]
        fn penalty_coverage_gaps_and_overlaps() {
            let penalties = r#"[
                {"faces": [2, 9], "on": "defense", "yards": 5},
                {"faces": [9, 15], "on": "offense", "yards": 10}
            ]"#;
            let json = book_json(&full_entries(), FULL_DOUBLES, "{}", penalties);
            let errors = errors_of(&json);
            assert!(errors.iter().any(|e| e.message.contains("face 9 is covered")));
            assert_eq!(
                errors.iter().filter(|e| e.message.contains("no penalty band")).count(),
                4
            );
        }

        #[test]
        fn wrong_dice_and_bad_sums_aggregate() {
            let json = book_json(
                r#"{"2": {"yards": 1}, "7": {"yards": 0, "tags": ["FUMBLE", "INTERCEPTION"]}}"#,
                FULL_DOUBLES,
                "{}",
                FULL_PENALTIES,
            )
            .replace(r#""sides": 20"#, r#""sides": 6"#);
            let errors = errors_of(&json);
            assert!(errors.iter().any(|e| e.path == "dice"));
            assert!(errors.iter().any(|e| e.path == "tables[0].entries.2"));
            assert!(errors.iter().any(|e| e.message.contains("conflicting")));
        }

        #[test]
        fn missing_ordinary_sums_are_warnings() {
            let json = book_json(
                r#"{"10": {"yards": 3}}"#,
                FULL_DOUBLES,
                "{}",
                FULL_PENALTIES,
            );
            let book = MatchupBook::from_json_str(&json).unwrap();
            assert_eq!(book.warnings().len(), 1);
            assert!(book.lookup("o1", "d1", Roll::new(4, 7)).is_none());
        }

        #[test]
        fn bounds_must_be_ordered() {
            let json = book_json(
                &full_entries(),
                FULL_DOUBLES,
                r#"{"expected_turnover_rate": [0.5, 0.1], "expected_yards_per_play": [9.0, 2.0]}"#,
                FULL_PENALTIES,
            );
            assert_eq!(errors_of(&json).len(), 2);
        }
    }

    #[test]
    fn meta_bound_check_reports_violations() {
        let meta = TableMeta {
            expected_turnover_rate: Some([0.0, 0.1]),
            expected_yards_per_play: Some([2.0, 6.0]),
            ..TableMeta::default()
        };
        assert!(meta.check_bounds(0.05, 4.0).is_empty());
        assert_eq!(meta.check_bounds(0.2, 7.0).len(), 2);
    }
}
