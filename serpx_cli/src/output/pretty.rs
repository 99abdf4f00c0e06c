//! Card-style terminal rendering of search results.
//!
//! One card per record: rank and bold title, the link in blue, then the
//! snippet wrapped to the terminal width and indented under the title.

use super::Paint;
use owo_colors::Style;
use serpx_core::SearchRecord;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: usize = 6;

const MAX_WIDTH: usize = 120;

pub fn format_records(query: &str, locale: &str, records: &[SearchRecord]) -> String {
    let width = terminal_width();
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} {} {}\n\n",
        "Search:".paint(Style::new().dimmed()),
        query.paint(Style::new().cyan().bold()),
        "locale:".paint(Style::new().dimmed()),
        locale.paint(Style::new().green())
    ));

    if records.is_empty() {
        output.push_str(&format!("{}\n", "No results found".paint(Style::new().yellow())));
        return output;
    }

    output.push_str(&format!(
        "{}\n\n",
        format!("{} results", records.len()).paint(Style::new().bold())
    ));
    for (i, record) in records.iter().enumerate() {
        output.push_str(&format_card(record, width));
        if i < records.len() - 1 {
            output.push('\n');
        }
    }
    output
}

fn format_card(record: &SearchRecord, width: usize) -> String {
    let mut output = String::new();
    let indent = " ".repeat(CARD_INDENT);

    let title = if record.title.is_empty() {
        "Untitled".paint(Style::new().dimmed())
    } else {
        record.title.paint(Style::new().bold())
    };
    output.push_str(&format!(
        "{}{}\n",
        format!(" {:>3}. ", record.rank_label()).paint(Style::new().cyan().bold()),
        title
    ));

    if record.link.is_empty() {
        output.push_str(&format!("{}{}\n", indent, "no link".paint(Style::new().dimmed())));
    } else {
        output.push_str(&format!("{}{}\n", indent, record.link.paint(Style::new().blue())));
    }

    if !record.snippet.is_empty() {
        let content_width = width.saturating_sub(CARD_INDENT + 2).max(20);
        for line in textwrap::wrap(&record.snippet, content_width) {
            output.push_str(&format!("{}{}\n", indent, line));
        }
    }
    output
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .min(MAX_WIDTH)
}
