//! The poll loop: fetch, validate, translate, notify, sleep, repeat.
//!
//! Any failure inside a cycle costs that cycle only. The loop logs it, optionally
//! reports it to the chat, and sleeps for the fixed interval like after a
//! successful cycle. Only configuration errors end the loop.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{Config, CursorPolicy},
    domain::Cursor,
    errors::Error,
    messaging::notifier::{Notifier, NotifyOutcome},
    ports::ReviewApi,
    translator::parse_status,
    validator::{check_response, current_date},
    Result,
};

/// Where the loop currently is within a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Validating,
    Translating,
    Notifying,
    Sleeping,
}

/// What a successful cycle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    NoChanges,
    Notified {
        message: String,
        outcome: NotifyOutcome,
    },
}

pub struct PollLoop {
    cfg: Arc<Config>,
    api: Arc<dyn ReviewApi>,
    notifier: Notifier,
    cursor: Cursor,
    phase: PollPhase,
    last_failure: Option<String>,
}

impl PollLoop {
    pub fn new(cfg: Arc<Config>, api: Arc<dyn ReviewApi>, notifier: Notifier) -> Self {
        let cursor = Cursor(cfg.initial_cursor);
        Self {
            cfg,
            api,
            notifier,
            cursor,
            phase: PollPhase::Idle,
            last_failure: None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Run cycles until `shutdown` is cancelled or a fatal error occurs.
    ///
    /// Cancellation is observed during the sleep step, so an in-flight cycle
    /// always completes first.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            cursor = %self.cursor,
            policy = ?self.cfg.cursor_policy,
            interval_secs = self.cfg.retry_interval.as_secs(),
            "poll loop started"
        );

        loop {
            match self.run_cycle().await {
                Ok(outcome) => {
                    self.last_failure = None;
                    tracing::debug!(?outcome, cursor = %self.cursor, "cycle finished");
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(critical = true, error = %e, "poll loop stopped");
                    return Err(e);
                }
                Err(e) => self.report_failure(&e).await,
            }

            self.phase = PollPhase::Sleeping;
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested, leaving poll loop");
                    self.phase = PollPhase::Idle;
                    return Ok(());
                }
                _ = sleep(self.cfg.retry_interval) => {}
            }
        }
    }

    /// One fetch, validate, translate, notify pass. Does not sleep.
    ///
    /// On error, [`PollLoop::phase`] is left at the step that failed.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.phase = PollPhase::Fetching;
        let response = self.api.fetch(Some(self.cursor)).await?;

        self.phase = PollPhase::Validating;
        let homeworks = check_response(&response)?;

        let outcome = match homeworks.first() {
            None => {
                tracing::debug!("no homework status changes");
                CycleOutcome::NoChanges
            }
            Some(homework) => {
                self.phase = PollPhase::Translating;
                let message = parse_status(homework)?;

                self.phase = PollPhase::Notifying;
                let outcome = self.notifier.notify(&message).await;
                CycleOutcome::Notified { message, outcome }
            }
        };

        if self.cfg.cursor_policy == CursorPolicy::AdvanceFromResponse {
            if let Some(ts) = current_date(&response) {
                tracing::debug!(from = %self.cursor, to = ts, "advancing cursor");
                self.cursor = Cursor(ts);
            }
        }

        self.phase = PollPhase::Idle;
        Ok(outcome)
    }

    async fn report_failure(&mut self, err: &Error) {
        let message = format!("Сбой в работе программы: {err}");
        tracing::error!(phase = ?self.phase, kind = ?err.kind(), error = %err, "cycle failed");
        eprintln!("{message}");

        if !self.cfg.notify_on_failure {
            return;
        }
        if self.last_failure.as_deref() == Some(message.as_str()) {
            tracing::debug!("same failure already reported, not notifying again");
            return;
        }

        if let NotifyOutcome::Failed(reason) = self.notifier.notify(&message).await {
            tracing::warn!(%reason, "failure report was not delivered");
        }
        self.last_failure = Some(message);
    }
}
