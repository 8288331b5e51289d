//! Status reporter: one transient message per page

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::{StatusKind, StatusMessage};
use crate::ports::StatusView;

/// Shows success/error/info messages through a `StatusView` and clears
/// them once they have been visible for `clear_after`.
pub struct StatusReporter {
    view: Arc<dyn StatusView>,
    clear_after: Duration,
    current: Option<StatusMessage>,
}

impl StatusReporter {
    pub fn new(view: Arc<dyn StatusView>, clear_after: Duration) -> Self {
        Self {
            view,
            clear_after,
            current: None,
        }
    }

    /// Replace whatever is showing with `text`
    pub fn show(&mut self, kind: StatusKind, text: impl Into<String>) {
        let message = StatusMessage::new(kind, text);
        self.view.render(&message);
        self.current = Some(message);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(StatusKind::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(StatusKind::Error, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(StatusKind::Info, text);
    }

    /// The visible message, if it has not expired yet
    pub fn current(&self) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|m| m.shown_at.elapsed() < self.clear_after)
    }

    /// Clear an expired message. Returns true if something was cleared.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|m| now.saturating_duration_since(m.shown_at) >= self.clear_after);
        if expired {
            self.clear();
        }
        expired
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.view.clear();
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingView {
        rendered: Mutex<Vec<String>>,
        clears: Mutex<usize>,
    }

    impl StatusView for CountingView {
        fn render(&self, message: &StatusMessage) {
            self.rendered.lock().unwrap().push(message.text.clone());
        }

        fn clear(&self) {
            *self.clears.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_show_replaces_previous_message() {
        let view = Arc::new(CountingView::default());
        let mut status = StatusReporter::new(view.clone(), Duration::from_secs(5));

        status.info("Connecting...");
        status.error("bad credentials");

        let current = status.current().unwrap();
        assert_eq!(current.kind, StatusKind::Error);
        assert_eq!(current.text, "bad credentials");
        assert_eq!(*view.rendered.lock().unwrap(), vec!["Connecting...", "bad credentials"]);
    }

    #[test]
    fn test_tick_clears_after_delay() {
        let view = Arc::new(CountingView::default());
        let mut status = StatusReporter::new(view.clone(), Duration::from_secs(5));
        status.success("Saved");
        let shown_at = status.current().unwrap().shown_at;

        assert!(!status.tick_at(shown_at + Duration::from_secs(4)));
        assert!(status.tick_at(shown_at + Duration::from_secs(5)));
        assert!(status.current().is_none());
        assert_eq!(*view.clears.lock().unwrap(), 1);

        // Nothing left to clear
        assert!(!status.tick_at(shown_at + Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_delay_is_never_visible() {
        let view = Arc::new(CountingView::default());
        let mut status = StatusReporter::new(view, Duration::ZERO);
        status.info("gone");
        assert!(status.current().is_none());
    }
}
