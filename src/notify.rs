//! Toast notifications raised by mutations.

use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub title: String,
    pub message: String,
}

/// Fan-out of notices to whatever displays them.
///
/// Sending with no subscriber is fine; the notice is still logged.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice {
            tone: Tone::Success,
            title: title.into(),
            message: message.into(),
        };
        info!(title = %notice.title, message = %notice.message, "Notice");
        let _ = self.sender.send(notice);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice {
            tone: Tone::Error,
            title: title.into(),
            message: message.into(),
        };
        warn!(title = %notice.title, message = %notice.message, "Notice");
        let _ = self.sender.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_notices() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.success("Book", "Book created");
        notifier.error("Book", "Server error 500: boom");

        assert_eq!(rx.recv().await.unwrap().tone, Tone::Success);
        let err = rx.recv().await.unwrap();
        assert_eq!(err.tone, Tone::Error);
        assert_eq!(err.message, "Server error 500: boom");
    }

    #[test]
    fn test_send_without_subscribers() {
        Notifier::new(1).success("Category", "Saved");
    }
}
