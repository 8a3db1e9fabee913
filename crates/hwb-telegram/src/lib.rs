//! Telegram adapter (teloxide).
//!
//! This crate implements the `hwb-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{prelude::*, types::Recipient};

use tokio::time::sleep;

use hwb_core::{domain::ChatId, errors::Error, messaging::port::MessagingPort, Result};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Notification(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!(retry_after = ?d, "telegram flood control, retrying");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Numeric ids address chats directly; anything else is treated as a `@channel` username.
pub fn recipient(chat_id: &ChatId) -> Recipient {
    let raw = chat_id.0.trim();
    match raw.parse::<i64>() {
        Ok(id) => Recipient::Id(teloxide::types::ChatId(id)),
        Err(_) if raw.starts_with('@') => Recipient::ChannelUsername(raw.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{raw}")),
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
        let to = recipient(chat_id);
        self.with_retry(|| self.bot.send_message(to.clone(), text.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_chat_id_is_a_direct_recipient() {
        assert_eq!(
            recipient(&ChatId("-1001234567890".to_string())),
            Recipient::Id(teloxide::types::ChatId(-1_001_234_567_890))
        );
        assert_eq!(
            recipient(&ChatId(" 42 ".to_string())),
            Recipient::Id(teloxide::types::ChatId(42))
        );
    }

    #[test]
    fn channel_names_get_an_at_prefix() {
        assert_eq!(
            recipient(&ChatId("@homework_feed".to_string())),
            Recipient::ChannelUsername("@homework_feed".to_string())
        );
        assert_eq!(
            recipient(&ChatId("homework_feed".to_string())),
            Recipient::ChannelUsername("@homework_feed".to_string())
        );
    }
}
