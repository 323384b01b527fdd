//! Success / error banner
//!
//! Errors stay until the next action replaces or clears them; success
//! messages disappear on their own after [`SUCCESS_TTL`].

use std::time::Duration;

use tokio::time::Instant;

use crate::ClientError;

pub const SUCCESS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    shown_at: Instant,
}

impl Notice {
    fn is_visible(&self, now: Instant) -> bool {
        match self.kind {
            NoticeKind::Error => true,
            NoticeKind::Success => now.duration_since(self.shown_at) < SUCCESS_TTL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(NoticeKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(NoticeKind::Error, message.into());
    }

    pub fn client_error(&mut self, err: &ClientError) {
        self.error(err.user_message());
    }

    fn show(&mut self, kind: NoticeKind, message: String) {
        self.current = Some(Notice {
            kind,
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The banner to render now, if any
    pub fn current(&self) -> Option<&Notice> {
        let now = Instant::now();
        self.current.as_ref().filter(|n| n.is_visible(now))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.current()
            .filter(|n| n.kind == NoticeKind::Error)
            .map(|n| n.message.as_str())
    }

    pub fn success_message(&self) -> Option<&str> {
        self.current()
            .filter(|n| n.kind == NoticeKind::Success)
            .map(|n| n.message.as_str())
    }
}
