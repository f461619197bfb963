use context_cli::api_client::{ApiError, SourceDescriptor};
use context_cli::orchestrator::SourceCatalog;

fn source(name: &str) -> SourceDescriptor {
    SourceDescriptor {
        name: name.to_string(),
        document_count: 0,
        created_at: String::new(),
        vector_size: 384,
    }
}

#[test]
fn second_create_of_the_same_name_is_caught_locally() {
    let mut catalog = SourceCatalog::new();
    assert!(catalog.ensure_absent("research").is_ok());

    // First create succeeded; the confirmed source lands in the cache
    // before any full refresh.
    catalog.insert(source("research"));

    // The repeat attempt never needs the network.
    let rejected = catalog.ensure_absent("research");
    assert!(matches!(rejected, Err(ApiError::Conflict(_))));
}

#[test]
fn ensure_absent_trims_the_candidate_name() {
    let mut catalog = SourceCatalog::new();
    catalog.insert(source("notes"));
    assert!(matches!(
        catalog.ensure_absent("  notes  "),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn replace_swaps_the_whole_snapshot() {
    let mut catalog = SourceCatalog::new();
    catalog.insert(source("old"));

    catalog.replace(vec![source("a"), source("b")]);
    assert_eq!(catalog.len(), 2);
    assert!(!catalog.contains("old"));
    assert!(catalog.contains("a"));
}

#[test]
fn insert_is_idempotent_per_name() {
    let mut catalog = SourceCatalog::new();
    catalog.insert(source("notes"));
    catalog.insert(source("notes"));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn remove_drops_only_the_named_source() {
    let mut catalog = SourceCatalog::new();
    catalog.replace(vec![source("a"), source("b")]);
    catalog.remove("a");
    assert_eq!(catalog.len(), 1);
    assert!(catalog.contains("b"));
}
