use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Initial `from_date` cursor (unix seconds).
pub const DATE_ZERO: i64 = 1_655_919_707;

pub const DEFAULT_RETRY_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Secrets required before the loop may start. All three are non-empty.
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// How the poll cursor evolves between cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPolicy {
    /// Re-query from the initial cursor every cycle.
    Fixed,
    /// Move the cursor to the response's `current_date` watermark after a valid response.
    AdvanceFromResponse,
}

/// Typed configuration, constructed once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,

    // Review API
    pub endpoint: String,
    pub request_timeout: Duration,

    // Poll loop
    pub retry_interval: Duration,
    pub initial_cursor: i64,
    pub cursor_policy: CursorPolicy,
    pub notify_on_failure: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| lookup(*key).and_then(non_empty).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| lookup(key).and_then(non_empty).unwrap_or_default();
        let credentials = Credentials {
            practicum_token: required("PRACTICUM_TOKEN"),
            telegram_token: required("TELEGRAM_TOKEN"),
            telegram_chat_id: required("TELEGRAM_CHAT_ID").trim().to_string(),
        };

        let endpoint = lookup("PRACTICUM_ENDPOINT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let request_timeout = Duration::from_secs(
            parse_u64(&lookup, "REQUEST_TIMEOUT")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        let retry_interval =
            Duration::from_secs(parse_u64(&lookup, "RETRY_TIME")?.unwrap_or(DEFAULT_RETRY_SECS));

        let initial_cursor = match lookup("FROM_DATE").and_then(non_empty) {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::Config(format!("FROM_DATE is not a unix timestamp: {v}")))?,
            None => DATE_ZERO,
        };

        let cursor_policy = if parse_bool(lookup("CURSOR_ADVANCE")).unwrap_or(false) {
            CursorPolicy::AdvanceFromResponse
        } else {
            CursorPolicy::Fixed
        };
        let notify_on_failure = parse_bool(lookup("NOTIFY_ON_FAILURE")).unwrap_or(false);

        Ok(Self {
            credentials,
            endpoint,
            request_timeout,
            retry_interval,
            initial_cursor,
            cursor_policy,
            notify_on_failure,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(raw) = lookup(key).and_then(non_empty) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
