//! Normalization of raw search responses into canonical records.
//!
//! Accepted shapes are classified once into [`RawInput`]:
//! - JSON text, decoded and then classified like any other value
//! - an envelope object carrying an `items` array (Google CSE native shape)
//! - an array that is already canonical, passed through without re-ranking
//! - anything else, which normalizes to an empty result set
//!
//! Only undecodable text is an error. Every decoded value normalizes.

use crate::error::{Result, SerpxError};
use crate::record::SearchRecord;
use serde_json::{Map, Value};

/// Raw search data in one of the accepted shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// JSON text that still has to be decoded
    EncodedText(String),
    /// Entries of an `items` array, in response order
    ItemsEnvelope(Vec<Value>),
    /// Records already in canonical shape
    CanonicalSequence(Vec<Value>),
    /// Any shape without results
    Other,
}

impl RawInput {
    /// Classify a decoded value by structure.
    pub fn classify(value: Value) -> RawInput {
        match value {
            Value::Object(mut obj) => match obj.remove("items") {
                Some(Value::Array(items)) => RawInput::ItemsEnvelope(items),
                // CSE omits `items` on zero hits; some proxies send null instead
                Some(Value::Null) => RawInput::ItemsEnvelope(Vec::new()),
                Some(other) => {
                    tracing::warn!(
                        items = json_type_name(&other),
                        "`items` is not an array, treating response as empty"
                    );
                    RawInput::ItemsEnvelope(Vec::new())
                }
                None => RawInput::Other,
            },
            Value::Array(records) => RawInput::CanonicalSequence(records),
            _ => RawInput::Other,
        }
    }

    /// Short name of the shape, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RawInput::EncodedText(_) => "encoded_text",
            RawInput::ItemsEnvelope(_) => "items_envelope",
            RawInput::CanonicalSequence(_) => "canonical_sequence",
            RawInput::Other => "other",
        }
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        RawInput::classify(value)
    }
}

impl From<&Value> for RawInput {
    fn from(value: &Value) -> Self {
        RawInput::classify(value.clone())
    }
}

impl From<String> for RawInput {
    fn from(text: String) -> Self {
        RawInput::EncodedText(text)
    }
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::EncodedText(text.to_string())
    }
}

impl From<&[SearchRecord]> for RawInput {
    fn from(records: &[SearchRecord]) -> Self {
        RawInput::CanonicalSequence(records.iter().map(SearchRecord::to_value).collect())
    }
}

impl From<&Vec<SearchRecord>> for RawInput {
    fn from(records: &Vec<SearchRecord>) -> Self {
        RawInput::from(records.as_slice())
    }
}

/// Normalize any accepted raw shape into an ordered list of records.
///
/// Fails with [`SerpxError::MalformedInput`] only when text input is not
/// valid JSON.
pub fn normalize(raw: impl Into<RawInput>) -> Result<Vec<SearchRecord>> {
    let raw = raw.into();
    tracing::trace!(kind = raw.kind(), "normalizing search response");
    match raw {
        RawInput::EncodedText(text) => {
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| SerpxError::MalformedInput(format!("invalid JSON: {}", e)))?;
            // classify never yields EncodedText, so a JSON string nested in the text is Other
            normalize(RawInput::classify(value))
        }
        RawInput::ItemsEnvelope(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| record_from_item(i as u64 + 1, item))
            .collect()),
        RawInput::CanonicalSequence(records) => {
            Ok(records.iter().map(record_from_canonical).collect())
        }
        RawInput::Other => Ok(Vec::new()),
    }
}

/// Normalize JSON text.
pub fn normalize_str(text: &str) -> Result<Vec<SearchRecord>> {
    normalize(text)
}

/// Normalize an already decoded value.
pub fn normalize_value(value: &Value) -> Result<Vec<SearchRecord>> {
    normalize(value)
}

fn record_from_item(rank: u64, item: &Value) -> SearchRecord {
    match item.as_object() {
        Some(obj) => SearchRecord {
            rank: Some(rank),
            title: text_field(obj, "title"),
            link: text_field(obj, "link"),
            snippet: text_field(obj, "snippet"),
        },
        None => SearchRecord {
            rank: Some(rank),
            ..Default::default()
        },
    }
}

/// Read a pass-through element as is. No re-ranking and no validation:
/// an unusable rank stays absent and odd text fields read like envelope ones.
fn record_from_canonical(value: &Value) -> SearchRecord {
    let Some(obj) = value.as_object() else {
        return SearchRecord::default();
    };
    SearchRecord {
        rank: obj.get("rank").and_then(rank_field),
        title: text_field(obj, "title"),
        link: text_field(obj, "link"),
        snippet: text_field(obj, "snippet"),
    }
}

fn rank_field(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ranks_follow_item_order() {
        let raw = json!({
            "kind": "customsearch#search",
            "items": [
                {"title": "A", "link": "http://a", "snippet": "sa"},
                {"title": "B", "link": "http://b", "snippet": "sb"},
                {"title": "C", "link": "http://c", "snippet": "sc"}
            ]
        });
        let records = normalize(&raw).unwrap();
        let ranks: Vec<Option<u64>> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(records[2].title, "C");
    }

    #[test]
    fn source_rank_fields_are_ignored_inside_envelopes() {
        let raw = json!({"items": [{"rank": 42, "title": "A"}, {"rank": 7, "title": "B"}]});
        let records = normalize(raw).unwrap();
        assert_eq!(records[0].rank, Some(1));
        assert_eq!(records[1].rank, Some(2));
    }

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let raw = json!({"items": [{"title": "Only title"}, {"link": null}]});
        let records = normalize(raw).unwrap();
        assert_eq!(records[0], SearchRecord::new(1, "Only title", "", ""));
        assert_eq!(records[1], SearchRecord::new(2, "", "", ""));
    }

    #[test]
    fn non_object_entries_keep_their_rank() {
        let raw = json!({"items": ["junk", {"title": "Real"}]});
        let records = normalize(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], SearchRecord::new(1, "", "", ""));
        assert_eq!(records[1].title, "Real");
    }

    #[test]
    fn scalar_fields_are_stringified() {
        let raw = json!({"items": [{"title": 404, "snippet": true}]});
        let records = normalize(raw).unwrap();
        assert_eq!(records[0].title, "404");
        assert_eq!(records[0].snippet, "true");
    }

    #[test]
    fn null_items_means_no_results() {
        assert!(normalize(json!({"items": null})).unwrap().is_empty());
    }

    #[test]
    fn non_array_items_means_no_results() {
        assert!(normalize(json!({"items": "nope"})).unwrap().is_empty());
        assert!(normalize(json!({"items": {"title": "x"}})).unwrap().is_empty());
    }

    #[test]
    fn canonical_sequences_pass_through_unchanged() {
        let raw = json!([
            {"rank": 5, "title": "Kept", "link": "http://k", "snippet": "s"},
            {"rank": 9, "title": "Also kept", "link": "", "snippet": ""}
        ]);
        let records = normalize(raw).unwrap();
        assert_eq!(records[0].rank, Some(5));
        assert_eq!(records[1].rank, Some(9));
        assert_eq!(records[1].title, "Also kept");
    }

    #[test]
    fn canonical_records_without_rank_stay_unranked() {
        let records = normalize(json!([{"title": "x", "link": "http://x", "snippet": "s"}])).unwrap();
        assert_eq!(records[0].rank, None);
        assert_eq!(records[0].title, "x");
    }

    #[test]
    fn canonical_records_are_read_leniently() {
        let raw = json!([
            {"rank": "1", "title": "numeric string rank"},
            {"rank": 2, "title": null, "link": 7},
            {"rank": -3, "snippet": false},
            "not a record"
        ]);
        let records = normalize(raw).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].rank, Some(1));
        assert_eq!(records[0].title, "numeric string rank");
        assert_eq!(records[1], SearchRecord::new(2, "", "7", ""));
        assert_eq!(records[2].rank, None);
        assert_eq!(records[2].snippet, "false");
        assert_eq!(records[3], SearchRecord::default());
    }

    #[test]
    fn decoded_values_never_fail() {
        for raw in [json!({"items": 5}), json!([null, [], 1.5]), json!(null)] {
            assert!(normalize(raw).is_ok());
        }
    }

    #[test]
    fn records_convert_back_into_raw_input() {
        let records = vec![SearchRecord::new(3, "T", "http://t", "s")];
        assert_eq!(normalize(&records).unwrap(), records);
    }

    #[test]
    fn other_shapes_are_empty() {
        assert!(normalize(json!({})).unwrap().is_empty());
        assert!(normalize(json!({"searchInformation": {}})).unwrap().is_empty());
        assert!(normalize(json!(42)).unwrap().is_empty());
        assert!(normalize(json!("text value")).unwrap().is_empty());
    }

    #[test]
    fn text_is_decoded_before_classification() {
        let text = r#"{"items":[{"title":"Test","link":"http://test.com","snippet":"Snippet"}]}"#;
        let records = normalize_str(text).unwrap();
        assert_eq!(records, vec![SearchRecord::new(1, "Test", "http://test.com", "Snippet")]);
    }

    #[test]
    fn nested_json_strings_do_not_recurse() {
        let text = serde_json::to_string(&json!("{\"items\":[{}]}")).unwrap();
        assert!(normalize_str(&text).unwrap().is_empty());
    }

    #[test]
    fn unparseable_text_fails() {
        let err = normalize_str("{not json").unwrap_err();
        assert!(matches!(err, SerpxError::MalformedInput(_)));
        assert_eq!(err.code_str(), "malformed_input");
    }
}
