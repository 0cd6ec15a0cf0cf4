//! Structured-output codec
//!
//! Turns the oracle's text payload into a typed value. Direct parse first;
//! if that fails, salvage the first balanced `{...}` span (models like to
//! wrap JSON in prose or code fences). Range checks are the caller's job.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Characters of the offending text kept for diagnostics
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Nothing came back. Usually a safety filter or transport anomaly.
    #[error("the oracle returned an empty response (possibly blocked by a safety filter)")]
    EmptyResponse,

    #[error("oracle did not return valid JSON. Text received: {preview}")]
    UnparsableResponse { preview: String },

    #[error("oracle JSON does not match the expected shape: {reason}")]
    ShapeMismatch { reason: String },
}

/// Parse the payload into raw JSON, salvaging an embedded object if needed.
pub fn parse_json_payload(text: Option<&str>) -> Result<Value, DecodeError> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(DecodeError::EmptyResponse),
    };

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    // A stray `{` in prose must not hide a valid object further on
    for (start, _) in text.match_indices('{') {
        let Some(span) = balanced_object_at(text, start) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            tracing::debug!(
                salvaged_len = span.len(),
                total_len = text.len(),
                "Salvaged JSON object from surrounding text"
            );
            return Ok(value);
        }
    }

    Err(DecodeError::UnparsableResponse {
        preview: preview(text),
    })
}

/// Parse and deserialize the payload into `T`.
pub fn decode_structured<T: DeserializeOwned>(text: Option<&str>) -> Result<T, DecodeError> {
    let value = parse_json_payload(text)?;
    serde_json::from_value(value).map_err(|e| DecodeError::ShapeMismatch {
        reason: e.to_string(),
    })
}

/// Balanced `{...}` span opening at byte `start`, ignoring braces inside
/// strings. `None` if the text ends before it closes.
fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
