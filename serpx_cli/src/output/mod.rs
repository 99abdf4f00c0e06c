use crate::cli::OutputFormat;
use crate::commands::Result;
use owo_colors::{OwoColorize, Stream, Style};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serpx_core::SearchRecord;
use std::fmt;

mod pretty;
pub use pretty::format_records;

/// Styling that honors `--no-color`, `NO_COLOR` and non-terminal streams.
pub trait Paint: OwoColorize + fmt::Display {
    /// Styled for stdout.
    fn paint(&self, style: Style) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.style(style))
            .to_string()
    }

    /// Styled for stderr.
    fn paint_err(&self, style: Style) -> String {
        self.if_supports_color(Stream::Stderr, |t| t.style(style))
            .to_string()
    }
}

impl<T: fmt::Display> Paint for T {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    pub name: String,
    pub suffix: String,
    pub mime_type: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    SearchResults {
        query: String,
        locale: String,
        records: Vec<SearchRecord>,
    },
    Exported {
        query: String,
        files: Vec<String>,
    },
    Formats(Vec<FormatInfo>),
    Languages(Vec<LanguageInfo>),
    ConfigInfo(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            format_text_output(data)?;
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::SearchResults {
            query,
            locale,
            records,
        } => {
            println!("Search results for '{}' ({}): {}", query, locale, records.len());
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.rank_label(),
                    record.title,
                    record.link,
                    record.snippet
                );
            }
        }
        OutputData::Exported { query, files } => {
            println!("Exported results for '{}':", query);
            for file in files {
                println!("{}", file);
            }
        }
        OutputData::Formats(formats) => {
            for f in formats {
                println!(
                    "{}\t{}\t{}\t{}",
                    f.name,
                    f.suffix,
                    f.mime_type,
                    if f.available { "available" } else { "unavailable" }
                );
            }
        }
        OutputData::Languages(languages) => {
            for l in languages {
                println!("{}\t{}\t{}", l.code, l.country, l.name);
            }
        }
        OutputData::ConfigInfo(config) => {
            println!("Configuration:");
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
