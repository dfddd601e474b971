//! Payload decoder
//!
//! Turns one received chunk into a [`SessionEvent`] or a [`RejectionReason`].
//! A chunk must hold exactly one JSON object. Nothing is buffered between
//! chunks, so an object split across two reads is rejected twice.

use serde_json::{Map, Value};

use crate::error::RejectionReason;
use crate::event::SessionEvent;

/// Keys every event object must carry
pub const REQUIRED_FIELDS: [&str; 3] = ["user_id", "action", "timestamp"];

/// Decode a single payload
///
/// Extra keys are ignored. Values are not coerced: `user_id` must be a JSON
/// integer, `action` a JSON string and `timestamp` a JSON number. The action
/// string itself is not checked against the enumeration here.
pub fn decode(payload: &[u8]) -> Result<SessionEvent, RejectionReason> {
    let text =
        std::str::from_utf8(payload).map_err(|e| RejectionReason::Encoding(e.to_string()))?;

    let value: Value =
        serde_json::from_str(text).map_err(|e| RejectionReason::MalformedJson(e.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(RejectionReason::MalformedJson(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )));
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(RejectionReason::MissingFields { missing });
    }

    let user_id = field(&fields, "user_id", "an integer", Value::as_i64)?;
    let action = field(&fields, "action", "a string", |v| v.as_str().map(str::to_owned))?;
    let timestamp = field(&fields, "timestamp", "a number", Value::as_f64)?;

    Ok(SessionEvent {
        user_id,
        action,
        timestamp,
    })
}

fn field<T>(
    fields: &Map<String, Value>,
    name: &'static str,
    expected: &'static str,
    extract: impl FnOnce(&Value) -> Option<T>,
) -> Result<T, RejectionReason> {
    fields
        .get(name)
        .and_then(extract)
        .ok_or(RejectionReason::InvalidField {
            field: name,
            expected,
        })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
