use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "serpx")]
#[command(about = "serpx - Web search with JSON, CSV and text export")]
#[command(version)]
#[command(after_help = "Quick Start:
  serpx search \"rust programming\"                 Search with default language (cs)
  serpx search \"rust\" --lang de --num 10          German results from Germany
  serpx search \"rust\" --export json,csv,txt       Save results in all formats
  serpx export response.json --format csv          Export a saved API response

Configuration:
  serpx config set-key                             Store the Google API key
  serpx config set google.cx <engine-id>           Store the search engine id
  serpx config show                                View current configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Copy the JSON export of the results to the clipboard
    #[arg(short, long, global = true)]
    pub copy: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the web via Google Custom Search
    ///
    /// The result country is derived from the language unless --country is given.
    #[command(after_help = "Languages:
  Run `serpx languages` for the known codes and their countries.
  Other codes are passed through and geolocate to US.

Examples:
  serpx search \"python programming\"
  serpx search \"zprávy\" --lang cs --num 10
  serpx search \"news\" --lang en --country GB
  serpx search \"rust\" --export csv --out-dir ./exports")]
    Search {
        /// The search query
        query: String,
        /// Result language (overrides config)
        #[arg(short, long)]
        lang: Option<String>,
        /// Country for geolocation (defaults to the language's country)
        #[arg(long)]
        country: Option<String>,
        /// Number of results, 1-10 (overrides config)
        #[arg(short, long)]
        num: Option<u8>,
        /// Comma-separated export formats to write: json, csv, txt
        #[arg(short, long, value_delimiter = ',')]
        export: Vec<String>,
        /// Directory for export files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Export a saved search response
    ///
    /// Accepts the raw API response, a JSON string of it, or already
    /// normalized records. Use '-' to read from stdin.
    #[command(after_help = "Examples:
  serpx export response.json --format csv
  serpx export response.json --format txt --query \"rust\" --out report.txt
  cat response.json | serpx export - --format json")]
    Export {
        /// Path to the response file, or '-' for stdin
        input: String,
        /// Export format: json, csv, txt
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Query shown in the text report header
        #[arg(short, long, default_value = "")]
        query: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show export formats and whether this build supports them
    #[command(alias = "formats")]
    Format,

    /// List known result languages with their default countries
    #[command(alias = "langs")]
    Languages,

    /// Manage configuration
    #[command(after_help = "Examples:
  serpx config show
  serpx config path
  serpx config set-key
  serpx config set google.cx 0123456789abcdef
  serpx config set search.language de
  serpx config set cache.ttl_secs 600")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show current configuration (secrets masked)
    Show,
    /// Print the config file location
    Path,
    /// Set a configuration value
    Set {
        /// Key: google.api_key, google.cx, search.language, search.country,
        /// search.num, cache.enabled, cache.ttl_secs
        key: String,
        /// New value
        value: String,
    },
    /// Prompt for the Google API key without echoing it
    SetKey,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}
