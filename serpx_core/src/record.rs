//! Canonical search result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One normalized search result.
///
/// Field declaration order is the serialization order (`rank`, `title`,
/// `link`, `snippet`) for both JSON and CSV exports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchRecord {
    /// 1-based position. Records passed through as already canonical keep
    /// whatever rank they arrived with, including none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub snippet: String,
}

impl SearchRecord {
    pub fn new(
        rank: u64,
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            rank: Some(rank),
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// Rank as shown in reports; `?` when the record has none.
    pub fn rank_label(&self) -> String {
        self.rank.map_or_else(|| "?".to_string(), |rank| rank.to_string())
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(rank) = self.rank {
            obj.insert("rank".into(), rank.into());
        }
        obj.insert("title".into(), self.title.clone().into());
        obj.insert("link".into(), self.link.clone().into());
        obj.insert("snippet".into(), self.snippet.clone().into());
        Value::Object(obj)
    }
}

/// Column names shared by the tabular exports.
pub const RECORD_FIELDS: [&str; 4] = ["rank", "title", "link", "snippet"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rank_is_left_out_of_json() {
        let record = SearchRecord {
            title: "t".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"title":"t","link":"","snippet":""}"#);
        assert_eq!(record.rank_label(), "?");
        assert!(record.to_value().get("rank").is_none());
    }
}
