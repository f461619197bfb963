use crate::composer::{ComposedContext, ContextComposer};
use crate::orchestrator::{RankedResult, SearchOutcome};
use crate::selection::SelectionSet;

/// The current ranked results and the selection over them.
///
/// Results are replaced wholesale by each successful search, never
/// merged across queries. The selection's lifetime is bounded by its
/// result set: `install` clears it before the new results are visible
/// to anything else, so a stale index can never reach a result set
/// that no longer exists.
#[derive(Debug, Default)]
pub struct SearchSession {
    results: Vec<RankedResult>,
    sources_searched: usize,
    failed_sources: usize,
    selection: SelectionSet,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the outcome of a successful search. Selection first,
    /// results second -- that order is the invariant.
    pub fn install(&mut self, outcome: SearchOutcome) {
        self.selection.clear();
        self.results = outcome.results;
        self.sources_searched = outcome.sources_searched;
        self.failed_sources = outcome.failed_sources;
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn sources_searched(&self) -> usize {
        self.sources_searched
    }

    pub fn failed_sources(&self) -> usize {
        self.failed_sources
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Toggle one result; out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index < self.results.len() {
            self.selection.toggle(index);
        }
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.results.len());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Compose the selected results into the copy/export artifact.
    pub fn compose(&self) -> ComposedContext {
        ContextComposer::compose(&self.results, &self.selection)
    }
}
