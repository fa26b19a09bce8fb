//! Bundled standard data.
//!
//! The "Pro Style" catalog, its free-text chart and the 2d20 matchup book
//! ship inside the crate so games and tests can run without external files.

use crate::card::CardCatalog;
use crate::chart::Chart;
use crate::error::TableError;
use crate::matchup::MatchupBook;

const STANDARD_CATALOG: &str = include_str!("../data/standard_catalog.json");
const STANDARD_CHART: &str = include_str!("../data/standard_chart.json");
const STANDARD_MATCHUPS: &str = include_str!("../data/standard_matchups.json");

/// Mean distance of the standard long-gain roll (1d6 over 20, 25, 30, 40, 50, 99).
pub const LONG_GAIN_MEAN: f64 = 44.0;

/// The bundled card catalog.
///
/// # Errors
///
/// Fails only if the bundled file is corrupt.
pub fn standard_catalog() -> Result<CardCatalog, TableError> {
    CardCatalog::from_json_str(STANDARD_CATALOG)
}

/// The bundled free-text chart.
///
/// # Errors
///
/// Fails only if the bundled file is corrupt.
pub fn standard_chart() -> Result<Chart, TableError> {
    Chart::from_json_str(STANDARD_CHART)
}

/// The bundled 2d20 matchup book.
///
/// # Errors
///
/// Fails only if the bundled file is corrupt.
pub fn standard_matchups() -> Result<MatchupBook, TableError> {
    MatchupBook::from_json_str(STANDARD_MATCHUPS)
}
