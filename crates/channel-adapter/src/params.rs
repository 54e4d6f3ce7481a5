//! Readers for the host's JSON parameter bag.

use serde_json::Value;

use crate::error::ActionError;

/// Trimmed, non-blank string parameter. Numbers are accepted as strings.
pub fn read_string(params: &Value, key: &str) -> Option<String> {
    let value = match params.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

pub fn require_string(params: &Value, key: &str) -> Result<String, ActionError> {
    read_string(params, key).ok_or_else(|| ActionError::missing(key))
}

/// Required string parameter that may be empty but must be present.
pub fn require_present_string(params: &Value, key: &str) -> Result<String, ActionError> {
    match params.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ActionError::missing(key)),
    }
}

/// Optional non-negative integer. Numeric strings are accepted; fractions
/// are truncated.
pub fn read_integer(params: &Value, key: &str) -> Result<Option<u32>, ActionError> {
    let number = match params.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match number {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(Some(n.trunc().min(u32::MAX as f64) as u32)),
        _ => Err(ActionError::Validation(format!(
            "{} must be a non-negative integer",
            key
        ))),
    }
}

/// `true` for a JSON `true` or the string "true".
pub fn read_bool(params: &Value, key: &str) -> bool {
    match params.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Channel id from `channelId`, falling back to the generic `to` target.
pub fn resolve_channel_id(params: &Value) -> Result<String, ActionError> {
    let raw = read_string(params, "channelId")
        .or_else(|| read_string(params, "to"))
        .ok_or_else(|| ActionError::Validation("channelId or to required".to_string()))?;
    let id = strip_channel_prefix(&raw);
    if id.is_empty() {
        return Err(ActionError::Validation(
            "channelId or to required".to_string(),
        ));
    }
    Ok(id.to_string())
}

fn strip_channel_prefix(raw: &str) -> &str {
    let raw = raw.strip_prefix("mattermost:").unwrap_or(raw);
    raw.strip_prefix("channel:").unwrap_or(raw).trim()
}
