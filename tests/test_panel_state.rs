use context_cli::panel_state::{PanelEffect, PanelLifecycle, PanelState, PanelTab};

#[test]
fn starts_closed_with_no_preview() {
    let lifecycle = PanelLifecycle::new();
    assert_eq!(lifecycle.state(), PanelState::Closed);
    assert!(lifecycle.pending_text().is_none());
    assert!(!lifecycle.is_busy());
}

#[test]
fn short_selections_are_ignored() {
    let mut lifecycle = PanelLifecycle::new();
    assert!(!lifecycle.selection_captured("abc", PanelTab::Add));
    assert!(!lifecycle.selection_captured("  ab  ", PanelTab::Add));
    assert_eq!(lifecycle.state(), PanelState::Closed);
    assert!(lifecycle.pending_text().is_none());
}

#[test]
fn capture_opens_the_panel_on_the_last_used_tab() {
    let mut lifecycle = PanelLifecycle::new();
    assert!(lifecycle.selection_captured("  some selected text  ", PanelTab::Search));
    assert_eq!(
        lifecycle.state(),
        PanelState::Open {
            tab: PanelTab::Search,
            minimized: false,
            busy: false,
        }
    );
    assert_eq!(lifecycle.pending_text(), Some("some selected text"));
}

#[test]
fn capture_refreshes_the_preview_whatever_tab_is_active() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Search);
    assert!(lifecycle.selection_captured("first capture", PanelTab::Add));

    // Panel stays on its current tab; only the preview updates.
    assert_eq!(lifecycle.tab(), Some(PanelTab::Search));
    assert_eq!(lifecycle.pending_text(), Some("first capture"));

    assert!(lifecycle.selection_captured("second capture", PanelTab::Add));
    assert_eq!(lifecycle.pending_text(), Some("second capture"));
}

#[test]
fn clearing_the_selection_only_drops_the_preview() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.selection_captured("some selected text", PanelTab::Add);
    lifecycle.selection_cleared();
    assert!(lifecycle.pending_text().is_none());
    assert!(lifecycle.is_open(), "visibility stays user-controlled");
}

#[test]
fn close_always_resets_busy() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Add);
    let ticket = lifecycle.begin_busy().expect("open panel issues tickets");
    assert!(lifecycle.is_busy());

    lifecycle.user_close();
    assert!(!lifecycle.is_open());
    assert!(!lifecycle.is_busy());

    // The in-flight operation eventually completes; its ticket is
    // stale and must not resurrect anything.
    assert!(!lifecycle.finish_busy(ticket));
    assert_eq!(lifecycle.state(), PanelState::Closed);
}

#[test]
fn stale_ticket_cannot_touch_a_reopened_panel() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Add);
    let old_ticket = lifecycle.begin_busy().unwrap();

    lifecycle.user_close();
    lifecycle.user_open(PanelTab::Search);
    let new_ticket = lifecycle.begin_busy().unwrap();

    assert!(!lifecycle.finish_busy(old_ticket), "old epoch is dead");
    assert!(lifecycle.is_busy(), "the new operation is unaffected");
    assert!(lifecycle.finish_busy(new_ticket));
    assert!(!lifecycle.is_busy());
}

#[test]
fn busy_clears_through_the_same_path_on_success_and_error() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Add);

    // Success path.
    let ticket = lifecycle.begin_busy().unwrap();
    assert!(lifecycle.finish_busy(ticket));
    assert!(!lifecycle.is_busy());

    // Error path runs the exact same cleanup.
    let ticket = lifecycle.begin_busy().unwrap();
    assert!(lifecycle.finish_busy(ticket));
    assert!(!lifecycle.is_busy());
}

#[test]
fn minimize_is_orthogonal_to_tab_and_busy() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Search);
    let _ticket = lifecycle.begin_busy().unwrap();

    lifecycle.minimize_toggle();
    assert!(lifecycle.is_minimized());
    assert!(lifecycle.is_busy());
    assert_eq!(lifecycle.tab(), Some(PanelTab::Search));

    lifecycle.minimize_toggle();
    assert!(!lifecycle.is_minimized());
}

#[test]
fn minimize_while_closed_is_a_no_op() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.minimize_toggle();
    assert_eq!(lifecycle.state(), PanelState::Closed);
}

#[test]
fn tab_switch_persists_and_reloads() {
    let mut lifecycle = PanelLifecycle::new();
    lifecycle.user_open(PanelTab::Add);

    let effects = lifecycle.switch_tab(PanelTab::Search);
    assert_eq!(
        effects,
        vec![
            PanelEffect::PersistTab(PanelTab::Search),
            PanelEffect::ReloadSources(PanelTab::Search),
        ]
    );
    assert_eq!(lifecycle.tab(), Some(PanelTab::Search));

    // Re-selecting the active tab does nothing.
    assert!(lifecycle.switch_tab(PanelTab::Search).is_empty());
}

#[test]
fn no_busy_ticket_while_closed() {
    let mut lifecycle = PanelLifecycle::new();
    assert!(lifecycle.begin_busy().is_none());
}
