//! Shape checks for decoded review API responses.

use serde_json::Value;

use crate::{errors::Error, Result};

/// Check a decoded response and extract its `homeworks` list.
///
/// Checks run in a fixed order and the first match wins: nested `error.error`,
/// then `code`, then the structural checks on `homeworks`.
pub fn check_response(response: &Value) -> Result<Vec<Value>> {
    tracing::debug!("checking review API response");

    if let Some(message) = response.get("error").and_then(|e| e.get("error")) {
        return Err(Error::Api(display_value(message)));
    }

    if let Some(code) = response.get("code") {
        let message = response.get("message").unwrap_or(code);
        return Err(Error::Api(display_value(message)));
    }

    let Some(obj) = response.as_object() else {
        return Err(Error::Shape(format!(
            "response is not an object: {}",
            json_type(response)
        )));
    };

    let homeworks = match obj.get("homeworks") {
        None | Some(Value::Null) => {
            return Err(Error::Shape("no assignments found".to_string()));
        }
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(Error::Shape(format!(
                "`homeworks` is not a list: {}",
                json_type(other)
            )));
        }
    };

    tracing::debug!(count = homeworks.len(), "review API response is well-formed");
    Ok(homeworks)
}

/// Watermark the API returns alongside the list, if any.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date").and_then(Value::as_i64)
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
