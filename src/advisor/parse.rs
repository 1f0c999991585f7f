//! Raw model text → wire plan set.
//!
//! Models wrap JSON in markdown fences, lead with prose, or (reasoning
//! models) emit `<think>` blocks before the payload. This module digs the
//! JSON out and runs it through the wire schema. Any failure here is
//! recoverable -- the caller substitutes the fallback planner.

use serde_json::Value;

use crate::schema::wire::WirePlanSet;
use crate::schema::ValidationError;

/// Why a raw model response could not become a wire plan set.
///
/// Never surfaced to end users; always absorbed by falling back.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// No JSON document could be extracted from the raw text.
    #[error("no JSON found in model response: {0}")]
    NotJson(String),
    /// The JSON did not satisfy the wire schema.
    #[error("model response failed wire validation: {0}")]
    Schema(#[from] ValidationError),
}

/// Extract and validate a wire plan set from raw model text.
///
/// Tries the trimmed text as JSON directly, then the contents of the
/// first markdown code fence. Reasoning tags are stripped first.
///
/// # Errors
///
/// Returns [`UpstreamError`] when no JSON can be found or the payload
/// fails wire validation.
pub fn parse_wire_text(raw: &str) -> Result<WirePlanSet, UpstreamError> {
    let cleaned = strip_reasoning_tags(raw);
    let trimmed = cleaned.trim();

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => v,
        Err(_) => {
            let block = extract_json_block(trimmed)
                .ok_or_else(|| UpstreamError::NotJson(truncate(trimmed, 120).to_owned()))?;
            serde_json::from_str::<Value>(block)
                .map_err(|_| UpstreamError::NotJson(truncate(block, 120).to_owned()))?
        }
    };

    Ok(WirePlanSet::from_value(&value)?)
}

/// Extract the contents of the first markdown code fence.
///
/// Accepts both ```` ```json ```` and bare ```` ``` ```` fences.
fn extract_json_block(text: &str) -> Option<&str> {
    let start_marker_json = "```json";
    let start_marker_plain = "```";

    let content_start = if let Some(pos) = text.find(start_marker_json) {
        pos.checked_add(start_marker_json.len())?
    } else if let Some(pos) = text.find(start_marker_plain) {
        pos.checked_add(start_marker_plain.len())?
    } else {
        return None;
    };

    let rest = text.get(content_start..)?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);

    let end_pos = rest.find("```")?;
    Some(rest.get(..end_pos)?.trim())
}

/// Remove `<think>...</think>` blocks some reasoning models prepend.
///
/// An unclosed `<think>` swallows the rest of the text -- everything after
/// it is chain-of-thought, not payload.
fn strip_reasoning_tags(response: &str) -> String {
    let mut result = response.to_owned();

    while let Some(start) = result.find("<think>") {
        if let Some(end) = result.find("</think>") {
            let tag_end = end.saturating_add("</think>".len());
            result = format!(
                "{}{}",
                result.get(..start).unwrap_or_default(),
                result.get(tag_end..).unwrap_or_default()
            );
        } else {
            result = result.get(..start).unwrap_or_default().to_owned();
            break;
        }
    }

    result
}

/// Truncate on a char boundary for error messages.
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    s.get(..end).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_WIRE: &str =
        r#"{"foundation":[],"growth":[],"accelerator":[],"elite":[]}"#;

    #[test]
    fn test_direct_json_parses() {
        let set = parse_wire_text(EMPTY_WIRE).expect("plain JSON should parse");
        assert!(set.foundation.is_empty());
    }

    #[test]
    fn test_fenced_json_parses() {
        let raw = format!("Here you go:\n\n```json\n{EMPTY_WIRE}\n```\n\nEnjoy!");
        parse_wire_text(&raw).expect("fenced JSON should parse");
    }

    #[test]
    fn test_plain_fence_parses() {
        let raw = format!("```\n{EMPTY_WIRE}\n```");
        parse_wire_text(&raw).expect("bare fence should parse");
    }

    #[test]
    fn test_think_tags_stripped() {
        let raw = format!("<think>\nfour tiers, let me plan...\n</think>\n{EMPTY_WIRE}");
        parse_wire_text(&raw).expect("payload after think block should parse");
    }

    #[test]
    fn test_unclosed_think_tag_fails() {
        let result = parse_wire_text("<think>\nstill thinking");
        assert!(matches!(result, Err(UpstreamError::NotJson(_))));
    }

    #[test]
    fn test_prose_fails_as_not_json() {
        let result = parse_wire_text("I'm sorry, I can't help with that.");
        assert!(matches!(result, Err(UpstreamError::NotJson(_))));
    }

    #[test]
    fn test_valid_json_wrong_shape_fails_schema() {
        let result = parse_wire_text(r#"{"foundation":[],"growth":[]}"#);
        assert!(matches!(result, Err(UpstreamError::Schema(_))));
    }

    #[test]
    fn test_json_array_fails_schema() {
        let result = parse_wire_text("[1, 2, 3]");
        assert!(matches!(result, Err(UpstreamError::Schema(_))));
    }
}
