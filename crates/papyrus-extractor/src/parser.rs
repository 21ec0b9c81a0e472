//! Parse model output into a metadata record
//!
//! Models wrap their answer in prose, markdown fences or both. The parser
//! slices from the first `{` to the last `}` and decodes that as a JSON
//! object, tolerating missing fields and a stringly-typed `year`.

use crate::error::ExtractorError;
use papyrus_domain::PaperMetadata;
use serde_json::{Map, Value};

/// Parse a raw model response into metadata
pub fn parse_llm_response(raw: &str) -> Result<PaperMetadata, ExtractorError> {
    let candidate = extract_json_candidate(raw).ok_or_else(|| ExtractorError::NoJsonFound {
        raw: raw.to_string(),
    })?;
    decode_metadata(candidate)
}

/// Slice from the first `{` through the last `}` after it.
///
/// Returns `None` when the text holds no `{`. With a `{` but no closing
/// brace the slice runs to the end of the text and will fail to decode.
pub fn extract_json_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    match raw.rfind('}') {
        Some(end) if end > start => Some(&raw[start..=end]),
        _ => Some(&raw[start..]),
    }
}

/// Decode a JSON candidate into metadata
pub fn decode_metadata(candidate: &str) -> Result<PaperMetadata, ExtractorError> {
    let malformed = |reason: String| ExtractorError::MalformedJson {
        candidate: candidate.to_string(),
        reason,
    };

    let json: Value = serde_json::from_str(candidate).map_err(|e| malformed(e.to_string()))?;
    let obj = json
        .as_object()
        .ok_or_else(|| malformed("Expected a JSON object".to_string()))?;

    Ok(PaperMetadata {
        title: text_field(obj, "title"),
        authors: text_field(obj, "authors"),
        publication: text_field(obj, "publication"),
        year: year_field(obj),
        summary: text_field(obj, "summary"),
    })
}

/// String value of `key`; absent, null or non-string values become `None`
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `year` as an integer, or a string holding one
fn year_field(obj: &Map<String, Value>) -> Option<i32> {
    let year = match obj.get("year")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(year).ok()
}
