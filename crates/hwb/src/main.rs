use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use hwb_core::{config::Config, domain::ChatId, messaging::notifier::Notifier, poller::PollLoop};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), hwb_core::Error> {
    hwb_core::logging::init("hwb")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(critical = true, error = %e, "missing required configuration");
            eprintln!("Check that PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID are set");
            return Err(e);
        }
    };

    let api = Arc::new(PracticumClient::from_config(&cfg)?);
    let messenger = Arc::new(TelegramMessenger::from_token(
        cfg.credentials.telegram_token.clone(),
    ));
    let notifier = Notifier::new(messenger, ChatId(cfg.credentials.telegram_chat_id.clone()));

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    PollLoop::new(cfg, api, notifier).run(shutdown).await
}
