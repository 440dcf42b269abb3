//! Detection of the embedded action payload in model replies.
//!
//! The model asks for a file by writing `{"action":"FILE_READ","path":"..."}`
//! somewhere in its reply. The scan is greedy: it takes everything from the
//! first `{` to the last `}` in the whole reply, so stray braces in prose or
//! several JSON objects in one reply make the payload unparseable and the
//! reply is then treated as ordinary text.

use serde_json::{Map, Value};

pub const FILE_READ_ACTION: &str = "FILE_READ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    FileRead { path: String },
    /// A payload was found but names no supported action.
    Unsupported { action: Option<String> },
}

/// Parses the span between the first `{` and the last `}` as a JSON object.
pub fn extract_json_payload(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Returns `None` when the reply carries no usable payload, including `{}`.
pub fn parse_action(text: &str) -> Option<ActionRequest> {
    let payload = extract_json_payload(text)?;
    if payload.is_empty() {
        return None;
    }

    let action = payload.get("action").and_then(Value::as_str);
    if action == Some(FILE_READ_ACTION) {
        // A missing path falls through to the existence check and is reported as not found.
        let path = payload
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Some(ActionRequest::FileRead { path });
    }

    Some(ActionRequest::Unsupported {
        action: action.map(str::to_string),
    })
}
