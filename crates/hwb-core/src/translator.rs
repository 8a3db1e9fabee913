//! Homework record to notification text.

use serde_json::Value;

use crate::{domain::HomeworkStatus, errors::Error, Result};

/// Build the notification sentence for one homework record.
pub fn parse_status(homework: &Value) -> Result<String> {
    tracing::debug!(%homework, "parsing homework record");

    let homework_name = required_str(homework, "homework_name")?;
    let code = required_str(homework, "status")?;

    let status =
        HomeworkStatus::from_code(code).ok_or_else(|| Error::UnknownStatus(code.to_string()))?;

    Ok(format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    ))
}

fn required_str<'a>(homework: &'a Value, key: &str) -> Result<&'a str> {
    match homework.get(key) {
        None => Err(Error::Shape(format!("homework record is missing `{key}`"))),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(Error::Shape(format!(
            "homework `{key}` is not a string: {other}"
        ))),
    }
}
