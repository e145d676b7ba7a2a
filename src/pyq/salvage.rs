//! Recover JSON from noisy or truncated model output.

use serde_json::{Map, Value};

/// Strip one leading ```json / ``` fence and one trailing ``` fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// First `{` through last `}` parsed as an object; anything else yields `None`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    match serde_json::from_str::<Value>(&text[first..=last]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// First `[` through the last complete `}`; a missing closing `]` is appended.
/// Returns an empty list when nothing parses.
pub fn extract_json_array(text: &str) -> Vec<Value> {
    let Some(first) = text.find('[') else {
        tracing::warn!(target: "pyq", "no opening bracket in model output");
        return Vec::new();
    };
    let last = match text.rfind('}') {
        Some(i) if i > first => i,
        _ => {
            tracing::warn!(target: "pyq", "no closing brace after opening bracket");
            return Vec::new();
        }
    };

    let mut repaired = text[first..=last].to_string();
    if !repaired.trim_end().ends_with(']') {
        repaired.push(']');
        tracing::info!(target: "pyq", "model output looks truncated; closing array");
    }

    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Array(items)) => items,
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!(target: "pyq", error = %e, "could not parse repaired array");
            Vec::new()
        }
    }
}
