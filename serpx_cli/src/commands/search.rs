use crate::cli::{Cli, OutputFormat};
use crate::commands::export::{parse_formats, write_exports};
use crate::commands::{copy_to_clipboard, CommandError, Result};
use crate::output::{format_output, format_records, LanguageInfo, OutputData, Paint};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Style;
use serpx_core::config::ConfigStore;
use serpx_core::{
    build_search, normalize, to_json, Language, Locale, SearchBackend, SearchRequest,
    SerpxConfig,
};
use std::path::Path;

pub struct SearchOptions<'a> {
    pub lang: Option<&'a str>,
    pub country: Option<&'a str>,
    pub num: Option<u8>,
    pub exports: &'a [String],
    pub out_dir: &'a Path,
    pub no_cache: bool,
}

/// Resolve the locale from flags, falling back to the config file.
///
/// An explicit `--country` always wins. Otherwise a `--lang` flag derives
/// its own country, and with neither flag the configured locale is used.
pub fn resolve_locale(config: &SerpxConfig, lang: Option<&str>, country: Option<&str>) -> Locale {
    match (lang, country) {
        (Some(lang), Some(country)) => Locale::with_country(lang, country),
        (None, Some(country)) => Locale::with_country(&config.search.language, country),
        (Some(lang), None) => Locale::from_language(lang),
        (None, None) => config.locale(),
    }
}

pub async fn run(cli: &Cli, query: &str, opts: SearchOptions<'_>) -> Result<()> {
    // Validate everything before touching the network
    let formats = parse_formats(opts.exports)?;

    let mut config = ConfigStore::new_default().load()?;
    if opts.no_cache {
        config.cache.enabled = false;
    }
    let locale = resolve_locale(&config, opts.lang, opts.country);
    let num = opts.num.unwrap_or(config.search.num);
    let request = SearchRequest::new(query, num, locale)?;

    let search = build_search(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(if cli.no_color {
                "{spinner} {msg}"
            } else {
                "{spinner:.green} {msg}"
            })
            .map_err(|e| CommandError::InvalidInput(e.to_string()))?,
    );
    spinner.set_message(format!(
        "Searching for '{}' ({})...",
        request.query(),
        request.locale()
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let response = search.search(&request).await;
    spinner.finish_and_clear();
    let raw = response?;

    let records = normalize(&raw)?;
    tracing::info!(
        query = request.query(),
        locale = %request.locale(),
        results = records.len(),
        "search finished"
    );

    let output_data = OutputData::SearchResults {
        query: request.query().to_string(),
        locale: request.locale().to_string(),
        records: records.clone(),
    };
    match cli.output {
        OutputFormat::Pretty => {
            println!("{}", format_records(request.query(), &request.locale().to_string(), &records));
        }
        _ => format_output(&output_data, &cli.output)?,
    }

    let written = write_exports(&records, &formats, request.query(), opts.out_dir)?;
    if !written.is_empty() {
        println!();
        println!("{}", "Exported:".paint(Style::new().bold().green()));
        for path in &written {
            println!("  {}", path.display().paint(Style::new().cyan()));
        }
    }

    if cli.copy {
        copy_to_clipboard(&to_json(&records)?)?;
        println!("{}", "Copied JSON results to clipboard".paint(Style::new().dimmed()));
    }

    Ok(())
}

pub fn language_table() -> Vec<LanguageInfo> {
    Language::ALL
        .iter()
        .map(|&l| LanguageInfo {
            code: l.code().to_string(),
            name: l.display_name().to_string(),
            country: l.country().to_string(),
        })
        .collect()
}

pub fn list_languages(cli: &Cli) -> Result<()> {
    let languages = language_table();
    match cli.output {
        OutputFormat::Pretty => {
            println!("{}", "Languages".paint(Style::new().bold().cyan()));
            println!();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Code", "Language", "Country"]);
            for info in &languages {
                table.add_row(vec![
                    Cell::new(&info.code),
                    Cell::new(&info.name),
                    Cell::new(&info.country),
                ]);
            }
            println!("{}", table);
            println!(
                "{}",
                "Other codes are accepted and geolocate to US.".paint(Style::new().dimmed())
            );
        }
        _ => format_output(&OutputData::Languages(languages), &cli.output)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_resolution_order() {
        let mut config = SerpxConfig::default();
        config.set("search.language", "de").unwrap();

        assert_eq!(resolve_locale(&config, None, None).to_string(), "de-DE");
        assert_eq!(resolve_locale(&config, Some("fr"), None).to_string(), "fr-FR");
        assert_eq!(resolve_locale(&config, None, Some("at")).to_string(), "de-AT");
        assert_eq!(
            resolve_locale(&config, Some("en"), Some("gb")).to_string(),
            "en-GB"
        );
        assert_eq!(resolve_locale(&config, Some("ja"), None).to_string(), "ja-US");
    }

    #[test]
    fn language_table_matches_locale_derivation() {
        let table = language_table();
        assert_eq!(table.len(), 8);
        assert_eq!(table[0].code, "cs");
        assert_eq!(table[0].name, "Čeština");
        for info in &table {
            assert_eq!(Locale::from_language(&info.code).country(), info.country);
        }
    }
}
