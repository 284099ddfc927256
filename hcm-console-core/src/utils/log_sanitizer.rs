//! Log sanitization utilities
//!
//! Keeps request payloads (which may hold passwords) from being fully
//! exposed in debug logs.

use serde_json::Value;

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Keys whose values are never written to logs.
const SECRET_KEYS: &[&str] = &["password", "confirmed_password"];

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Render a payload for logging with secrets masked and the text truncated.
pub fn payload_for_log(payload: &Value) -> String {
    let mut masked = payload.clone();
    if let Some(obj) = masked.as_object_mut() {
        for key in SECRET_KEYS {
            if let Some(v) = obj.get_mut(*key) {
                *v = Value::String("***".to_string());
            }
        }
    }
    truncate_for_log(&masked.to_string())
}
