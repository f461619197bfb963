use crate::debouncer::Debouncer;
use std::time::{Duration, Instant};

/// Selections shorter than this (after trimming) are noise, not intent.
pub const MIN_SELECTION_CHARS: usize = 4;

/// Raw text-selection events from the hosting surface. In the terminal
/// rendition these come from bracketed paste.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    Selected(String),
    Cleared,
}

/// What the capture layer hands to the panel lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureAction {
    Captured(String),
    Cleared,
}

/// Debounced intake of host selection events.
///
/// Selection events arrive in rapid succession while the user is still
/// dragging; only the final state matters. A single pending slot in the
/// debouncer guarantees bursts collapse to one capture.
#[derive(Debug)]
pub struct SelectionCapture {
    debouncer: Debouncer<String>,
}

impl SelectionCapture {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    /// Feed one host event. Clears pass through immediately; selections
    /// are trimmed, length-gated, and deferred.
    pub fn handle(&mut self, event: CaptureEvent) -> Option<CaptureAction> {
        match event {
            CaptureEvent::Selected(text) => {
                let trimmed = text.trim();
                if trimmed.chars().count() >= MIN_SELECTION_CHARS {
                    self.debouncer.push(trimmed.to_string());
                }
                None
            }
            CaptureEvent::Cleared => {
                self.debouncer.cancel();
                Some(CaptureAction::Cleared)
            }
        }
    }

    /// Release a settled capture, if any. Polled from the event loop.
    pub fn poll(&mut self) -> Option<CaptureAction> {
        self.debouncer.poll().map(CaptureAction::Captured)
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<CaptureAction> {
        self.debouncer.poll_at(now).map(CaptureAction::Captured)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
