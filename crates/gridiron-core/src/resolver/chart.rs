//! Chart-backed resolver.

use std::sync::Arc;
use tracing::warn;

use playbook::{Chart, OutcomeKind, OutcomeRecord, RandomSource};

use super::PlayResolver;
use crate::call::PlayCall;

/// Resolves calls by chart cell: `(deck, play label, defense letter)`.
///
/// Cells were parsed when the chart loaded, so resolution is a map lookup.
/// The chart draws no dice of its own.
#[derive(Debug, Clone)]
pub struct ChartResolver {
    chart: Arc<Chart>,
}

impl ChartResolver {
    /// Creates a resolver over a loaded chart.
    #[must_use]
    pub fn new(chart: Arc<Chart>) -> Self {
        Self { chart }
    }

    /// The chart in use.
    #[must_use]
    pub fn chart(&self) -> &Chart {
        &self.chart
    }
}

impl PlayResolver for ChartResolver {
    fn name(&self) -> &str {
        "chart"
    }

    fn resolve(&self, call: &PlayCall, _dice: &mut dyn RandomSource) -> OutcomeRecord {
        let offense = &call.offense;
        let letter = call.defense.letter;
        match self.chart.lookup(&offense.deck, &offense.label, letter) {
            Some(record) if record.kind == OutcomeKind::Other => {
                warn!(
                    deck = %offense.deck,
                    play = %offense.label,
                    %letter,
                    text = %record.source,
                    "unparseable chart cell, using neutral result"
                );
                OutcomeRecord::neutral()
            }
            Some(record) => record.clone(),
            None => {
                warn!(
                    deck = %offense.deck,
                    play = %offense.label,
                    %letter,
                    "missing chart cell, using neutral result"
                );
                OutcomeRecord::neutral()
            }
        }
    }
}
