use context_cli::capture::{CaptureAction, CaptureEvent, SelectionCapture};
use std::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(100);

#[test]
fn rapid_selections_collapse_to_the_last_one() {
    let mut capture = SelectionCapture::new(DELAY);
    let start = Instant::now();

    capture.handle(CaptureEvent::Selected("first selection".to_string()));
    capture.handle(CaptureEvent::Selected("second selection".to_string()));
    capture.handle(CaptureEvent::Selected("third selection".to_string()));

    // Nothing fires before the debounce window closes.
    assert_eq!(capture.poll_at(start + Duration::from_millis(10)), None);

    assert_eq!(
        capture.poll_at(start + Duration::from_millis(500)),
        Some(CaptureAction::Captured("third selection".to_string()))
    );
    // One capture per burst.
    assert_eq!(capture.poll_at(start + Duration::from_secs(2)), None);
}

#[test]
fn short_selections_never_become_pending() {
    let mut capture = SelectionCapture::new(DELAY);

    capture.handle(CaptureEvent::Selected("abc".to_string()));
    capture.handle(CaptureEvent::Selected("  ab  ".to_string()));

    assert!(!capture.is_pending());
    assert_eq!(capture.poll_at(Instant::now() + Duration::from_secs(1)), None);
}

#[test]
fn four_chars_after_trim_is_enough() {
    let mut capture = SelectionCapture::new(DELAY);
    capture.handle(CaptureEvent::Selected("  abcd  ".to_string()));
    assert!(capture.is_pending());

    assert_eq!(
        capture.poll_at(Instant::now() + Duration::from_secs(1)),
        Some(CaptureAction::Captured("abcd".to_string()))
    );
}

#[test]
fn clear_cancels_the_pending_capture() {
    let mut capture = SelectionCapture::new(DELAY);

    capture.handle(CaptureEvent::Selected("some selected text".to_string()));
    assert!(capture.is_pending());

    let action = capture.handle(CaptureEvent::Cleared);
    assert_eq!(action, Some(CaptureAction::Cleared));
    assert!(!capture.is_pending());
    assert_eq!(capture.poll_at(Instant::now() + Duration::from_secs(1)), None);
}

#[test]
fn captured_text_is_trimmed() {
    let mut capture = SelectionCapture::new(DELAY);
    capture.handle(CaptureEvent::Selected("   hello world   \n".to_string()));

    assert_eq!(
        capture.poll_at(Instant::now() + Duration::from_secs(1)),
        Some(CaptureAction::Captured("hello world".to_string()))
    );
}
