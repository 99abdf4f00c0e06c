use crate::cli::{Cli, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, FormatInfo, OutputData, Paint};
use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::Style;
use serde_json::Value;
use serpx_core::{export_records, ExportFormat, RawInput, SearchRecord, SerpxError};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Characters replaced in the query part of export file names.
const UNSAFE_FILENAME_CHARS: &[char] = &[' ', '/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// File name without suffix: `results_{query}_{YYYYmmdd_HHMMSS}`.
pub fn export_file_stem(query: &str, generated_at: &DateTime<Local>) -> String {
    let timestamp = generated_at.format("%Y%m%d_%H%M%S");
    let query: String = query
        .trim()
        .chars()
        .map(|c| {
            if UNSAFE_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if query.is_empty() {
        format!("results_{}", timestamp)
    } else {
        format!("results_{}_{}", query, timestamp)
    }
}

pub fn parse_formats(names: &[String]) -> Result<Vec<ExportFormat>> {
    let mut formats = Vec::new();
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        let format: ExportFormat = name.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Write one file per format into `out_dir`.
///
/// A format this build cannot produce is skipped with a warning; the other
/// formats are still written.
pub fn write_exports(
    records: &[SearchRecord],
    formats: &[ExportFormat],
    query: &str,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if formats.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(out_dir)?;
    let stem = export_file_stem(query, &Local::now());

    let mut written = Vec::new();
    for &format in formats {
        let blob = match export_records(records, format, query) {
            Ok(blob) => blob,
            Err(SerpxError::DependencyUnavailable(backend)) => {
                tracing::warn!(%format, backend, "export backend unavailable, skipping");
                eprintln!(
                    "{} {} export skipped: '{}' backend not built in",
                    "Warning:".paint_err(Style::new().yellow().bold()),
                    format,
                    backend
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let path = out_dir.join(format!("{}{}", stem, blob.suffix));
        std::fs::write(&path, blob.body.as_bytes())?;
        tracing::debug!(path = %path.display(), mime = blob.mime_type, "wrote export");
        written.push(path);
    }
    Ok(written)
}

/// Export a saved response read from a file or stdin.
pub fn run(cli: &Cli, input: &str, format: &str, query: &str, out: Option<&Path>) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    if !format.is_available() {
        return Err(CommandError::Core(SerpxError::DependencyUnavailable("csv")));
    }

    let text = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };

    let blob = serpx_core::export(saved_response(text), format, query)?;

    match out {
        Some(path) => {
            std::fs::write(path, blob.body.as_bytes())?;
            let output_data = OutputData::Exported {
                query: query.to_string(),
                files: vec![path.display().to_string()],
            };
            format_output(&output_data, &cli.output)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(blob.body.as_bytes())?;
            if !blob.body.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    if cli.copy && format == ExportFormat::Json {
        crate::commands::copy_to_clipboard(&blob.body)?;
    }
    Ok(())
}

/// Classify a saved response. A file holding a JSON string (a response
/// that was stored already encoded) is decoded one level further.
fn saved_response(text: String) -> RawInput {
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::String(inner)) => RawInput::EncodedText(inner),
        Ok(value) => RawInput::classify(value),
        // let the core report the parse failure
        Err(_) => RawInput::EncodedText(text),
    }
}

pub fn list_formats(cli: &Cli) -> Result<()> {
    let formats: Vec<FormatInfo> = ExportFormat::ALL
        .iter()
        .map(|&f| FormatInfo {
            name: f.name().to_string(),
            suffix: f.extension().to_string(),
            mime_type: f.mime_type().to_string(),
            available: f.is_available(),
        })
        .collect();

    match cli.output {
        OutputFormat::Pretty => {
            println!("{}", "Export Formats".paint(Style::new().bold().cyan()));
            println!();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Format", "Suffix", "MIME type", "Available"]);
            for info in &formats {
                table.add_row(vec![
                    Cell::new(&info.name),
                    Cell::new(&info.suffix),
                    Cell::new(&info.mime_type),
                    Cell::new(if info.available { "yes" } else { "no (rebuild with --features csv)" }),
                ]);
            }
            println!("{}", table);
        }
        _ => format_output(&OutputData::Formats(formats), &cli.output)?,
    }
    Ok(())
}
