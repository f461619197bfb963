use crate::orchestrator::RankedResult;
use crate::selection::SelectionSet;

/// Fixed header for the rendered blob.
pub const CONTEXT_HEADER: &str = "===== Selected Context =====";

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedEntry {
    /// 1-based position within the composed artifact
    pub ordinal: usize,
    /// Human-readable relevance, e.g. "87% match"
    pub relevance: String,
    /// Full untruncated result text
    pub body: String,
}

/// The text artifact assembled from the user's selected results.
/// Derived on demand for a copy or export action, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedContext {
    pub entries: Vec<ComposedEntry>,
    pub rendered: String,
}

impl ComposedContext {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct ContextComposer;

impl ContextComposer {
    /// Build the composite document for the selected results.
    ///
    /// Entries follow ascending original-rank order, not the order the
    /// user toggled them in. Pure: same inputs, same artifact.
    pub fn compose(results: &[RankedResult], selection: &SelectionSet) -> ComposedContext {
        let entries: Vec<ComposedEntry> = selection
            .ordered()
            .filter_map(|index| results.get(index))
            .enumerate()
            .map(|(i, result)| ComposedEntry {
                ordinal: i + 1,
                relevance: format!("{:.0}% match", result.score * 100.0),
                body: result.text.clone(),
            })
            .collect();

        let mut rendered = String::from(CONTEXT_HEADER);
        for entry in &entries {
            rendered.push_str("\n\n");
            rendered.push_str(&format!("[{}] ({})\n", entry.ordinal, entry.relevance));
            rendered.push_str(&entry.body);
        }
        rendered.push('\n');

        ComposedContext { entries, rendered }
    }
}
