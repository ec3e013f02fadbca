//! Transient user-facing status messages.

use std::time::{Duration, Instant};

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Single-slot message surface. A newer message replaces the current one and
/// restarts the timeout.
#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<(StatusMessage, Instant)>,
}

impl StatusLine {
    pub fn show(&mut self, message: StatusMessage, now: Instant) {
        self.current = Some((message, now + STATUS_TTL));
    }

    pub fn visible(&self, now: Instant) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|(_, deadline)| now < *deadline)
            .map(|(message, _)| message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_visible_until_deadline() {
        let start = Instant::now();
        let mut line = StatusLine::default();
        line.show(StatusMessage::success("saved"), start);

        assert_eq!(line.visible(start).map(|m| m.text.as_str()), Some("saved"));
        assert!(line.visible(start + Duration::from_millis(3499)).is_some());
        assert!(line.visible(start + STATUS_TTL).is_none());
    }

    #[test]
    fn newer_message_overwrites_and_restarts_timer() {
        let start = Instant::now();
        let mut line = StatusLine::default();
        line.show(StatusMessage::success("first"), start);
        let later = start + Duration::from_secs(3);
        line.show(StatusMessage::error("second"), later);

        let shown = line
            .visible(start + Duration::from_secs(4))
            .expect("second still visible");
        assert_eq!(shown.text, "second");
        assert!(shown.is_error());
    }
}
