//! Federated search across context sources.
//!
//! One `execute` call fans a query out to one or all known sources,
//! waits for every branch to settle, then merges, ranks and truncates
//! into a single atomic result set. A failed source degrades to an
//! empty partial result and a bumped failure counter; it never aborts
//! the other branches. Nothing here cancels an in-flight request --
//! overlap is prevented at the trigger layer, and whichever response
//! settles last wins.

use crate::api_client::{ApiError, ApiResult, ContextBackend, SearchRow, SourceDescriptor};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Server-side cap on a single search request.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Floor for the per-source quota in an ALL-scope fan-out.
pub const MIN_PER_SOURCE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchScope {
    AllSources,
    Source(String),
}

#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub scope: SearchScope,
    pub limit: usize,
    pub min_score: f32,
}

impl Query {
    /// Trim, clamp and reject empty text up front.
    pub fn new(text: &str, scope: SearchScope, limit: usize, min_score: f32) -> ApiResult<Self> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ApiError::Validation("Query text is empty".to_string()));
        }
        Ok(Self {
            text,
            scope,
            limit: limit.clamp(1, MAX_SEARCH_LIMIT),
            min_score: min_score.clamp(0.0, 1.0),
        })
    }
}

/// A merged result row, tagged with the source it came from.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub source: String,
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: Map<String, Value>,
}

impl RankedResult {
    fn from_row(source: &str, row: SearchRow) -> Self {
        Self {
            source: source.to_string(),
            id: row.id,
            text: row.text,
            score: row.score,
            metadata: row.metadata,
        }
    }
}

/// The atomic outcome of one `execute` call.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Ranked rows, non-increasing score, at most `limit` long
    pub results: Vec<RankedResult>,
    /// How many sources the query fanned out to
    pub sources_searched: usize,
    /// How many of those branches failed
    pub failed_sources: usize,
}

/// Per-source quota for an ALL-scope fan-out.
///
/// Oversamples each source so the true global top-`limit` survives an
/// uneven distribution of good hits across sources.
pub fn per_source_limit(limit: usize, source_count: usize) -> usize {
    let spread = limit.div_ceil(source_count.max(1)) + 1;
    spread.max(MIN_PER_SOURCE_LIMIT).min(MAX_SEARCH_LIMIT)
}

/// Read-only snapshot of the known sources, refreshed per operation.
/// Also the authority for the local duplicate-name pre-check.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<SourceDescriptor>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, sources: Vec<SourceDescriptor>) {
        self.sources = sources;
    }

    /// Register a source the server just confirmed, ahead of the next
    /// full refresh. Keeps the duplicate pre-check authoritative.
    pub fn insert(&mut self, descriptor: SourceDescriptor) {
        if !self.contains(&descriptor.name) {
            self.sources.push(descriptor);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.sources.retain(|s| s.name != name);
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn get(&self, index: usize) -> Option<&SourceDescriptor> {
        self.sources.get(index)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name == name)
    }

    /// Local duplicate check: a name already in the cached list is
    /// rejected without a network call. The server-side rejection for
    /// races is still honored by the caller.
    pub fn ensure_absent(&self, name: &str) -> ApiResult<()> {
        if self.contains(name.trim()) {
            Err(ApiError::Conflict(format!(
                "Source '{}' already exists",
                name.trim()
            )))
        } else {
            Ok(())
        }
    }
}

pub struct SearchOrchestrator {
    backend: Arc<dyn ContextBackend>,
}

impl SearchOrchestrator {
    pub fn new(backend: Arc<dyn ContextBackend>) -> Self {
        Self { backend }
    }

    /// Run one federated search. The caller observes exactly one
    /// atomic outcome; partial results are never emitted.
    ///
    /// `known_sources` is the panel's cached catalog, used only to
    /// validate a single-source scope before dispatch. ALL scope
    /// re-resolves the list from the server.
    pub async fn execute(
        &self,
        query: &Query,
        known_sources: &[SourceDescriptor],
    ) -> ApiResult<SearchOutcome> {
        if query.text.trim().is_empty() {
            return Err(ApiError::Validation("Query text is empty".to_string()));
        }

        match &query.scope {
            SearchScope::Source(name) => {
                if !known_sources.iter().any(|s| &s.name == name) {
                    return Err(ApiError::Validation(format!("Unknown source '{}'", name)));
                }
                self.execute_single(name, query).await
            }
            SearchScope::AllSources => self.execute_fan_out(query).await,
        }
    }

    async fn execute_single(&self, source: &str, query: &Query) -> ApiResult<SearchOutcome> {
        let limit = query.limit.min(MAX_SEARCH_LIMIT);
        match self
            .backend
            .search(source, &query.text, limit, query.min_score)
            .await
        {
            Ok(rows) => {
                let mut results: Vec<RankedResult> = rows
                    .into_iter()
                    .map(|row| RankedResult::from_row(source, row))
                    .collect();
                rank(&mut results, limit);
                Ok(SearchOutcome {
                    results,
                    sources_searched: 1,
                    failed_sources: 0,
                })
            }
            Err(e) => {
                warn!("Search against '{}' failed: {}", source, e);
                Ok(SearchOutcome {
                    results: Vec::new(),
                    sources_searched: 1,
                    failed_sources: 1,
                })
            }
        }
    }

    async fn execute_fan_out(&self, query: &Query) -> ApiResult<SearchOutcome> {
        let sources = self.backend.list_sources().await?;
        if sources.is_empty() {
            return Ok(SearchOutcome::default());
        }

        let quota = per_source_limit(query.limit, sources.len());
        debug!(
            "Fanning out to {} sources, {} results each",
            sources.len(),
            quota
        );

        let backend = &self.backend;
        let branches = sources.iter().map(|descriptor| {
            let name = descriptor.name.clone();
            async move {
                let settled = backend
                    .search(&name, &query.text, quota, query.min_score)
                    .await;
                (name, settled)
            }
        });

        // Every branch settles, success or failure, before any merging.
        let settled = join_all(branches).await;

        let mut merged: Vec<RankedResult> = Vec::new();
        let mut failed_sources = 0;
        for (name, result) in settled {
            match result {
                Ok(rows) => {
                    merged.extend(rows.into_iter().map(|row| RankedResult::from_row(&name, row)));
                }
                Err(e) => {
                    // Bulkhead: this source contributes nothing, the rest stand.
                    warn!("Source '{}' failed during fan-out: {}", name, e);
                    failed_sources += 1;
                }
            }
        }

        rank(&mut merged, query.limit);

        Ok(SearchOutcome {
            results: merged,
            sources_searched: sources.len(),
            failed_sources,
        })
    }
}

/// Stable-sort descending by score, then truncate to the budget.
/// Ties keep first-seen order: source enumeration order, then
/// within-source order.
fn rank(results: &mut Vec<RankedResult>, limit: usize) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(limit);
}
