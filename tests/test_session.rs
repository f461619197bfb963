use context_cli::orchestrator::{RankedResult, SearchOutcome};
use context_cli::session::SearchSession;
use serde_json::Map;

fn ranked(text: &str, score: f32) -> RankedResult {
    RankedResult {
        source: "notes".to_string(),
        id: String::new(),
        text: text.to_string(),
        score,
        metadata: Map::new(),
    }
}

fn outcome(texts: &[(&str, f32)]) -> SearchOutcome {
    SearchOutcome {
        results: texts.iter().map(|(t, s)| ranked(t, *s)).collect(),
        sources_searched: 1,
        failed_sources: 0,
    }
}

#[test]
fn select_all_then_toggle() {
    let mut session = SearchSession::new();
    session.install(outcome(&[
        ("r0", 0.9),
        ("r1", 0.8),
        ("r2", 0.7),
        ("r3", 0.6),
        ("r4", 0.5),
    ]));

    session.select_all();
    assert_eq!(session.selection().count(), 5);

    session.toggle(2);
    assert_eq!(session.selection().count(), 4);
}

#[test]
fn installing_a_new_result_set_clears_the_selection() {
    let mut session = SearchSession::new();
    session.install(outcome(&[("old0", 0.9), ("old1", 0.8), ("old2", 0.7)]));
    session.select_all();
    assert_eq!(session.selection().count(), 3);

    // New results arrive: the selection dies with the set it indexed.
    session.install(outcome(&[("new0", 0.95), ("new1", 0.85)]));
    assert_eq!(session.selection().count(), 0);
    assert_eq!(session.len(), 2);
    assert_eq!(session.results()[0].text, "new0");
}

#[test]
fn results_are_replaced_wholesale_never_merged() {
    let mut session = SearchSession::new();
    session.install(outcome(&[("a", 0.9), ("b", 0.8)]));
    session.install(outcome(&[("c", 0.7)]));

    assert_eq!(session.len(), 1);
    assert_eq!(session.results()[0].text, "c");
}

#[test]
fn toggle_out_of_range_is_ignored() {
    let mut session = SearchSession::new();
    session.install(outcome(&[("only", 0.9)]));

    session.toggle(5);
    assert_eq!(session.selection().count(), 0);

    session.toggle(0);
    assert_eq!(session.selection().count(), 1);
}

#[test]
fn failure_counts_travel_with_the_outcome() {
    let mut session = SearchSession::new();
    session.install(SearchOutcome {
        results: vec![ranked("hit", 0.9)],
        sources_searched: 3,
        failed_sources: 1,
    });

    assert_eq!(session.sources_searched(), 3);
    assert_eq!(session.failed_sources(), 1);
}

#[test]
fn compose_reflects_the_current_selection() {
    let mut session = SearchSession::new();
    session.install(outcome(&[("first", 0.9), ("second", 0.5)]));
    session.toggle(1);

    let composed = session.compose();
    assert_eq!(composed.entries.len(), 1);
    assert_eq!(composed.entries[0].body, "second");
    assert_eq!(composed.entries[0].relevance, "50% match");
}
