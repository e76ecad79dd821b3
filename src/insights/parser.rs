/// Extraction of JSON payloads from model output
///
/// Models wrap JSON in markdown fences, prefix it with chatter, or both.
/// `parse_fenced_json` is the one place that deals with that; every
/// synthesizer goes through it.

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The text holds no parseable JSON document
    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON, but missing fields, wrong types or unknown enum values
    #[error("Model output does not match the expected shape: {0}")]
    Schema(String),
}

/// Pull the JSON document out of `text` and deserialize it into `T`
///
/// Candidates are tried in order: a ```` ```json ```` fence, any other fence
/// with its language tag removed, the outermost `{...}` slice, then the whole
/// text. The first one that deserializes wins. When none does, a shape
/// mismatch is reported ahead of a syntax error.
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let mut schema_error = None;
    let mut last_error = None;

    for candidate in candidates(text) {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => match e.classify() {
                Category::Data => schema_error = Some(ParseError::Schema(e.to_string())),
                _ => last_error = Some(ParseError::InvalidJson(e.to_string())),
            },
        }
    }

    Err(schema_error
        .or(last_error)
        .unwrap_or_else(|| ParseError::InvalidJson("no JSON object found".to_string())))
}

fn candidates(text: &str) -> Vec<&str> {
    let brace_slice = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    };

    let mut found: Vec<&str> = Vec::with_capacity(4);
    let ordered = [
        fenced_block(text, "```json"),
        fenced_block(text, "```").map(strip_language_tag),
        brace_slice,
        Some(text.trim()),
    ];
    for candidate in ordered.into_iter().flatten() {
        if !candidate.is_empty() && !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

/// Drop a leading info string such as `JSON` or `javascript` from a fence body
fn strip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest))
            if !first.trim().is_empty()
                && first
                    .trim()
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+') =>
        {
            rest.trim()
        }
        _ => body,
    }
}

/// Contents between an opening marker and the next closing fence
///
/// An unterminated fence runs to the end of the text.
fn fenced_block<'a>(text: &'a str, opening: &str) -> Option<&'a str> {
    let start = text.find(opening)? + opening.len();
    let rest = &text[start..];
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim())
}
