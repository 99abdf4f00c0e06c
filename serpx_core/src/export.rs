//! Export of normalized results as JSON, CSV and plain text.
//!
//! Every encoder normalizes its input first, so all formats are rendered
//! from the same record list. Output is built in memory and returned whole;
//! a failing encoder never hands back a partial blob.

use crate::error::{Result, SerpxError};
use crate::normalize::{normalize, RawInput};
use crate::record::SearchRecord;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the rule under the text report header
const TEXT_RULE_WIDTH: usize = 60;

const UNTITLED: &str = "Untitled";
const LINK_UNAVAILABLE: &str = "N/A";
const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Text];

    /// File suffix including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => ".json",
            ExportFormat::Csv => ".csv",
            ExportFormat::Text => ".txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }

    /// Whether this build can produce the format.
    pub fn is_available(self) -> bool {
        match self {
            ExportFormat::Csv => csv_export_available(),
            ExportFormat::Json | ExportFormat::Text => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = SerpxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Text),
            other => Err(SerpxError::InvalidParams(format!(
                "Unknown export format '{}'. Expected one of: json, csv, txt",
                other
            ))),
        }
    }
}

/// A finished export: file suffix, MIME type and the encoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub format: ExportFormat,
    pub suffix: &'static str,
    pub mime_type: &'static str,
    pub body: String,
}

/// Compile-time capability check for the CSV backend.
pub const fn csv_export_available() -> bool {
    cfg!(feature = "csv")
}

/// Pretty-printed JSON array of records. Non-ASCII text is written as-is.
pub fn to_json(raw: impl Into<RawInput>) -> Result<String> {
    let records = normalize(raw)?;
    records_to_json(&records)
}

/// CSV document with a `rank,title,link,snippet` header row.
pub fn to_csv(raw: impl Into<RawInput>) -> Result<String> {
    if !csv_export_available() {
        return Err(SerpxError::DependencyUnavailable("csv"));
    }
    let records = normalize(raw)?;
    records_to_csv(&records)
}

/// Human-readable report stamped with the current local time.
pub fn to_text(raw: impl Into<RawInput>, query: &str) -> Result<String> {
    to_text_at(raw, query, &Local::now())
}

/// Human-readable report stamped with `generated_at`.
pub fn to_text_at<Tz>(
    raw: impl Into<RawInput>,
    query: &str,
    generated_at: &DateTime<Tz>,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let records = normalize(raw)?;
    Ok(records_to_text(&records, query, generated_at))
}

/// Encode `raw` in `format`. `query` only appears in the text report.
pub fn export(raw: impl Into<RawInput>, format: ExportFormat, query: &str) -> Result<ExportBlob> {
    let body = match format {
        ExportFormat::Json => to_json(raw)?,
        ExportFormat::Csv => to_csv(raw)?,
        ExportFormat::Text => to_text(raw, query)?,
    };
    Ok(ExportBlob {
        format,
        suffix: format.extension(),
        mime_type: format.mime_type(),
        body,
    })
}

/// Encode already normalized records, skipping the normalization step.
pub fn export_records(
    records: &[SearchRecord],
    format: ExportFormat,
    query: &str,
) -> Result<ExportBlob> {
    let body = match format {
        ExportFormat::Json => records_to_json(records)?,
        ExportFormat::Csv => {
            if !csv_export_available() {
                return Err(SerpxError::DependencyUnavailable("csv"));
            }
            records_to_csv(records)?
        }
        ExportFormat::Text => records_to_text(records, query, &Local::now()),
    };
    Ok(ExportBlob {
        format,
        suffix: format.extension(),
        mime_type: format.mime_type(),
        body,
    })
}

fn records_to_json(records: &[SearchRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(feature = "csv")]
fn records_to_csv(records: &[SearchRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(crate::record::RECORD_FIELDS)
        .map_err(csv_error)?;
    for record in records {
        // an unranked pass-through record leaves the rank cell empty
        let rank = record.rank.map(|r| r.to_string()).unwrap_or_default();
        writer
            .write_record([
                rank.as_str(),
                record.title.as_str(),
                record.link.as_str(),
                record.snippet.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SerpxError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SerpxError::MalformedInput(e.to_string()))
}

#[cfg(not(feature = "csv"))]
fn records_to_csv(_records: &[SearchRecord]) -> Result<String> {
    Err(SerpxError::DependencyUnavailable("csv"))
}

#[cfg(feature = "csv")]
fn csv_error(err: csv::Error) -> SerpxError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => SerpxError::Io(io),
        other => SerpxError::MalformedInput(format!("CSV encoding failed: {:?}", other)),
    }
}

fn records_to_text<Tz>(records: &[SearchRecord], query: &str, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    out.push_str(&format!("Search results: {}\n", query));
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%d.%m.%Y %H:%M:%S")
    ));
    out.push_str(&"=".repeat(TEXT_RULE_WIDTH));
    out.push_str("\n\n");

    for record in records {
        out.push_str(&format!(
            "{}. {}\n",
            record.rank_label(),
            non_empty_or(&record.title, UNTITLED)
        ));
        out.push_str(&format!(
            "   URL: {}\n",
            non_empty_or(&record.link, LINK_UNAVAILABLE)
        ));
        out.push_str(&format!(
            "   {}\n\n",
            non_empty_or(&record.snippet, NO_DESCRIPTION)
        ));
    }
    out
}

fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn two_results() -> serde_json::Value {
        json!({"items": [
            {"title": "A", "link": "http://a", "snippet": "sa"},
            {"title": "B", "link": "http://b", "snippet": "sb"}
        ]})
    }

    #[test]
    fn json_keeps_key_order_and_non_ascii() {
        let raw = json!({"items": [{"title": "Český text", "link": "http://test.cz", "snippet": "Příliš žluťoučký kůň"}]});
        let out = to_json(&raw).unwrap();
        assert!(out.contains("Český text"));
        assert!(out.contains("Příliš žluťoučký kůň"));
        let rank = out.find("\"rank\"").unwrap();
        let title = out.find("\"title\"").unwrap();
        let link = out.find("\"link\"").unwrap();
        let snippet = out.find("\"snippet\"").unwrap();
        assert!(rank < title && title < link && link < snippet);
        assert!(out.contains('\n'), "expected indented output");
    }

    #[test]
    fn json_of_empty_input_is_empty_array() {
        assert_eq!(to_json(json!({})).unwrap(), "[]");
    }

    #[cfg(feature = "csv")]
    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let out = to_csv(two_results()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "rank,title,link,snippet");
        assert_eq!(lines[1], "1,A,http://a,sa");
        assert_eq!(lines[2], "2,B,http://b,sb");
    }

    #[cfg(feature = "csv")]
    #[test]
    fn csv_quotes_delimiters_quotes_and_newlines() {
        let raw = json!({"items": [{"title": "a, b", "link": "http://x", "snippet": "say \"hi\"\nbye"}]});
        let out = to_csv(raw).unwrap();
        assert!(out.contains("\"a, b\""));
        assert!(out.contains("\"say \"\"hi\"\"\nbye\""));
    }

    #[cfg(feature = "csv")]
    #[test]
    fn csv_leaves_missing_rank_empty() {
        let out = to_csv(json!([{"title": "x", "link": "http://x"}])).unwrap();
        assert_eq!(out, "rank,title,link,snippet\n,x,http://x,\n");
    }

    #[cfg(feature = "csv")]
    #[test]
    fn csv_of_empty_input_is_header_only() {
        assert_eq!(to_csv(json!({})).unwrap(), "rank,title,link,snippet\n");
    }

    #[cfg(not(feature = "csv"))]
    #[test]
    fn csv_without_backend_is_a_distinct_error() {
        let err = to_csv(two_results()).unwrap_err();
        assert!(matches!(err, SerpxError::DependencyUnavailable("csv")));
    }

    #[test]
    fn text_report_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let raw = json!({"items": [
            {"title": "Test Title", "link": "http://test.com", "snippet": "Test snippet"},
            {}
        ]});
        let out = to_text_at(raw, "test query", &at).unwrap();
        let expected = format!(
            "Search results: test query\nGenerated: 09.03.2024 14:05:07\n{}\n\n\
             1. Test Title\n   URL: http://test.com\n   Test snippet\n\n\
             2. Untitled\n   URL: N/A\n   No description\n\n",
            "=".repeat(60)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn text_report_without_results_has_only_header() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let out = to_text_at(json!({}), "nothing", &at).unwrap();
        assert_eq!(out.lines().count(), 4);
        assert!(!out.contains("URL:"));
    }

    #[test]
    fn formats_parse_and_describe_themselves() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(ExportFormat::Csv.extension(), ".csv");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.is_available(), csv_export_available());
    }

    #[test]
    fn export_builds_the_triple() {
        let blob = export(two_results(), ExportFormat::Json, "q").unwrap();
        assert_eq!(blob.suffix, ".json");
        assert_eq!(blob.mime_type, "application/json");
        let decoded: Vec<SearchRecord> = serde_json::from_str(&blob.body).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn export_records_matches_export_of_raw() {
        let records = normalize(two_results()).unwrap();
        let from_records = export_records(&records, ExportFormat::Json, "q").unwrap();
        let from_raw = export(two_results(), ExportFormat::Json, "q").unwrap();
        assert_eq!(from_records, from_raw);
    }
}
