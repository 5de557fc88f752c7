//! Shape checks for a decoded status response.
//!
//! A response is trusted only after [`check`] has confirmed that the
//! `homeworks` key exists and holds an array of well-formed entries.

use serde::Deserialize;
use serde_json::Value;

use reviewwatch_types::{Cursor, MonitoredItem};

use crate::AdapterError;

/// Key holding the collection of monitored items.
pub const HOMEWORKS_KEY: &str = "homeworks";

/// Key holding the server time the response was produced at.
pub const SERVER_TIME_KEY: &str = "current_date";

/// Validate a decoded response and unwrap its items.
///
/// Returns the items in response order. Fails with
/// [`AdapterError::MissingField`] when the `homeworks` key is absent and with
/// [`AdapterError::MalformedField`] when its value is not an array or one of
/// its entries lacks a string `homework_name` / `status`.
pub fn check(raw: &Value) -> Result<Vec<MonitoredItem>, AdapterError> {
    let field = raw
        .get(HOMEWORKS_KEY)
        .ok_or_else(|| AdapterError::MissingField(HOMEWORKS_KEY.to_string()))?;

    let entries = field.as_array().ok_or_else(|| AdapterError::MalformedField {
        field: HOMEWORKS_KEY.to_string(),
        reason: format!("expected an array, found {}", kind(field)),
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            MonitoredItem::deserialize(entry).map_err(|e| AdapterError::MalformedField {
                field: format!("{}[{}]", HOMEWORKS_KEY, index),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Read the optional server time (`current_date`, epoch seconds).
pub fn server_time(raw: &Value) -> Option<Cursor> {
    raw.get(SERVER_TIME_KEY)
        .and_then(Value::as_u64)
        .map(Cursor::from_secs)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
