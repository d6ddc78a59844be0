//! Parsing and normalization of raw provider text.
//!
//! Provider output is untrusted: it may wrap the JSON object in prose or code
//! fences. The object is located by the first `{` and the last `}`; anything
//! that does not parse as a JSON object there is a `MalformedResponse`.

use crate::error::GenerationError;
use serde_json::{Map, Value};

/// Headline length cap, in characters.
pub const MAX_HEADLINE_CHARS: usize = 140;

/// Maximum number of tags kept per item.
pub const MAX_TAGS: usize = 10;

/// A JSON object extracted from provider output.
pub type ParsedObject = Map<String, Value>;

/// Normalized text fields of a generated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub headline: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Extract the JSON object embedded in `raw`.
pub fn extract_object(raw: &str) -> Result<ParsedObject, GenerationError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(GenerationError::MalformedResponse(
            "no JSON object found in response".to_string(),
        ));
    };
    if end < start {
        return Err(GenerationError::MalformedResponse(
            "no JSON object found in response".to_string(),
        ));
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(GenerationError::MalformedResponse(
            "response JSON is not an object".to_string(),
        )),
        Err(e) => Err(GenerationError::MalformedResponse(format!(
            "invalid JSON in response: {}",
            e
        ))),
    }
}

/// Normalize the fields of a parsed object into an item draft.
///
/// Fails with `EmptyField` when `headline` or `content` is empty after
/// normalization.
pub fn normalize(object: &ParsedObject) -> Result<ItemDraft, GenerationError> {
    let headline: String = field_text(object.get("headline"))
        .chars()
        .take(MAX_HEADLINE_CHARS)
        .collect::<String>()
        .trim()
        .to_string();
    if headline.is_empty() {
        return Err(GenerationError::EmptyField("headline"));
    }

    let content = field_text(object.get("content")).trim().to_string();
    if content.is_empty() {
        return Err(GenerationError::EmptyField("content"));
    }

    let tags = match object.get("tags") {
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| field_text(Some(value)).trim().to_string())
            .filter(|tag| !tag.is_empty())
            .take(MAX_TAGS)
            .collect(),
        _ => Vec::new(),
    };

    Ok(ItemDraft {
        headline,
        content,
        tags,
    })
}

/// Parse and normalize in one step.
pub fn parse_response(raw: &str) -> Result<ItemDraft, GenerationError> {
    normalize(&extract_object(raw)?)
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
