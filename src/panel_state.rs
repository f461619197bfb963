//! Panel lifecycle state machine.
//!
//! Visibility, active tab, minimized and busy flags live here, driven
//! by user and host events. The machine is synchronous; asynchronous
//! completions re-enter it through epoch-stamped tickets so that a
//! panel torn down mid-operation can never be resurrected by a late
//! response.

use serde::{Deserialize, Serialize};

use crate::capture::MIN_SELECTION_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelTab {
    Add,
    Search,
}

impl Default for PanelTab {
    fn default() -> Self {
        PanelTab::Add
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open {
        tab: PanelTab,
        minimized: bool,
        busy: bool,
    },
}

/// Side effects a transition asks its caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEffect {
    /// Persist the chosen tab to settings
    PersistTab(PanelTab),
    /// Reload the source list scoped to the given tab
    ReloadSources(PanelTab),
}

/// Handle for one busy operation. Stamped with the lifecycle epoch at
/// issue time; a close in between invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyTicket {
    epoch: u64,
}

#[derive(Debug)]
pub struct PanelLifecycle {
    state: PanelState,
    pending_text: Option<String>,
    epoch: u64,
}

impl Default for PanelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLifecycle {
    pub fn new() -> Self {
        Self {
            state: PanelState::Closed,
            pending_text: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, PanelState::Open { busy: true, .. })
    }

    pub fn is_minimized(&self) -> bool {
        matches!(
            self.state,
            PanelState::Open {
                minimized: true,
                ..
            }
        )
    }

    pub fn tab(&self) -> Option<PanelTab> {
        match self.state {
            PanelState::Open { tab, .. } => Some(tab),
            PanelState::Closed => None,
        }
    }

    /// Text captured from the host, waiting in the Add tab preview.
    pub fn pending_text(&self) -> Option<&str> {
        self.pending_text.as_deref()
    }

    /// A host selection settled. Selections of more than three chars
    /// open the panel (on the last-used tab) if it is closed, and
    /// always refresh the pending-text preview, whichever tab is
    /// active. Returns whether the event was accepted.
    pub fn selection_captured(&mut self, text: &str, last_tab: PanelTab) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_SELECTION_CHARS {
            return false;
        }
        if self.state == PanelState::Closed {
            self.state = PanelState::Open {
                tab: last_tab,
                minimized: false,
                busy: false,
            };
        }
        self.pending_text = Some(trimmed.to_string());
        true
    }

    /// The host selection went away. Only the preview clears; panel
    /// visibility stays user-controlled.
    pub fn selection_cleared(&mut self) {
        self.pending_text = None;
    }

    /// The user opened the panel directly (no captured selection).
    pub fn user_open(&mut self, tab: PanelTab) {
        if self.state == PanelState::Closed {
            self.state = PanelState::Open {
                tab,
                minimized: false,
                busy: false,
            };
        }
    }

    /// Unconditional close and full reset: whatever async work is
    /// still outstanding, busy and any dimming are gone now, and the
    /// epoch bump guarantees the eventual completion is discarded.
    pub fn user_close(&mut self) {
        self.state = PanelState::Closed;
        self.epoch += 1;
    }

    /// Orthogonal to tab and busy; a no-op while closed.
    pub fn minimize_toggle(&mut self) {
        if let PanelState::Open { minimized, .. } = &mut self.state {
            *minimized = !*minimized;
        }
    }

    /// Switch tabs. The caller persists the tab and reloads the
    /// source list, per the returned effects.
    pub fn switch_tab(&mut self, new_tab: PanelTab) -> Vec<PanelEffect> {
        match &mut self.state {
            PanelState::Open { tab, .. } if *tab != new_tab => {
                *tab = new_tab;
                vec![
                    PanelEffect::PersistTab(new_tab),
                    PanelEffect::ReloadSources(new_tab),
                ]
            }
            _ => Vec::new(),
        }
    }

    /// Enter the busy state for a save or search. `None` while closed:
    /// nothing to dim, nothing to run.
    pub fn begin_busy(&mut self) -> Option<BusyTicket> {
        match &mut self.state {
            PanelState::Open { busy, .. } => {
                *busy = true;
                Some(BusyTicket { epoch: self.epoch })
            }
            PanelState::Closed => None,
        }
    }

    /// Leave the busy state. This is the guaranteed-cleanup path: the
    /// caller invokes it on success and on error alike. Returns false
    /// for stale tickets -- the panel closed since the operation began,
    /// and nothing may be resurrected.
    pub fn finish_busy(&mut self, ticket: BusyTicket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        match &mut self.state {
            PanelState::Open { busy, .. } => {
                *busy = false;
                true
            }
            PanelState::Closed => false,
        }
    }
}
