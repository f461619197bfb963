use context_cli::config::{Settings, SettingsStore};
use context_cli::panel_state::PanelTab;
use std::cell::Cell;
use std::fs;
use std::rc::Rc;

#[test]
fn defaults_apply_when_no_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::load_from(dir.path().join("config.toml"));

    let settings = store.current();
    assert_eq!(settings.server.base_url, "http://127.0.0.1:8000");
    assert_eq!(settings.search.limit, 5);
    assert!((settings.search.min_score - 0.3).abs() < f32::EPSILON);
    assert_eq!(settings.panel.last_tab, PanelTab::Add);
}

#[test]
fn updates_persist_across_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut store = SettingsStore::load_from(path.clone());
    store
        .update(|s| {
            s.server.base_url = "http://10.0.0.2:9000".to_string();
            s.panel.last_tab = PanelTab::Search;
        })
        .unwrap();

    let reloaded = SettingsStore::load_from(path);
    let settings = reloaded.current();
    assert_eq!(settings.server.base_url, "http://10.0.0.2:9000");
    assert_eq!(settings.panel.last_tab, PanelTab::Search);
}

#[test]
fn malformed_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "this is { not toml").unwrap();

    let store = SettingsStore::load_from(path);
    assert_eq!(store.current(), Settings::default());
}

#[test]
fn subscribers_hear_every_change() {
    let mut store = SettingsStore::in_memory(Settings::default());
    let heard = Rc::new(Cell::new(0));

    let counter = heard.clone();
    store.subscribe(move |_| counter.set(counter.get() + 1));

    store.update(|s| s.search.limit = 10).unwrap();
    store.override_session(|s| s.server.base_url = "http://localhost:9999".to_string());

    assert_eq!(heard.get(), 2);
    assert_eq!(store.current().search.limit, 10);
}

#[test]
fn session_overrides_do_not_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut store = SettingsStore::load_from(path.clone());
    store.update(|s| s.search.limit = 7).unwrap();
    store.override_session(|s| s.server.base_url = "http://override:1".to_string());

    let reloaded = SettingsStore::load_from(path);
    assert_eq!(reloaded.current().search.limit, 7);
    assert_eq!(reloaded.current().server.base_url, "http://127.0.0.1:8000");
}
