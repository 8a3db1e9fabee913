use std::sync::Arc;

use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Result of a best-effort delivery. Failures are reported, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum NotifyOutcome {
    Delivered,
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered)
    }
}

/// Sends notifications to the one configured chat.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    pub async fn notify(&self, message: &str) -> NotifyOutcome {
        match self.messenger.send_text(&self.chat_id, message).await {
            Ok(()) => {
                tracing::info!(chat_id = %self.chat_id, "message sent: {message}");
                NotifyOutcome::Delivered
            }
            Err(e) => {
                tracing::error!(chat_id = %self.chat_id, error = %e, "message was not sent");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Error, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeMessenger {
        fail: bool,
        sends: Mutex<Vec<(ChatId, String)>>,
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Notification("chat not found".to_string()));
            }
            self.sends
                .lock()
                .unwrap()
                .push((chat_id.clone(), text.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_to_configured_chat() {
        let messenger = Arc::new(FakeMessenger {
            fail: false,
            sends: Mutex::new(Vec::new()),
        });
        let notifier = Notifier::new(messenger.clone(), ChatId("42".to_string()));

        let outcome = notifier.notify("hello").await;

        assert!(outcome.is_delivered());
        let sends = messenger.sends.lock().unwrap();
        assert_eq!(sends.as_slice(), &[(ChatId("42".to_string()), "hello".to_string())]);
    }

    #[tokio::test]
    async fn send_failure_becomes_failed_outcome() {
        let messenger = Arc::new(FakeMessenger {
            fail: true,
            sends: Mutex::new(Vec::new()),
        });
        let notifier = Notifier::new(messenger, ChatId("42".to_string()));

        let outcome = notifier.notify("hello").await;

        assert_eq!(
            outcome,
            NotifyOutcome::Failed("notification error: chat not found".to_string())
        );
    }
}
