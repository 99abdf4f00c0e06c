use clap::Parser;
use owo_colors::Style;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;
use output::Paint;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let default_filter = match cli.verbose {
        0 => "serpx_cli=info",
        1 => "serpx_cli=debug,serpx_core=debug",
        _ => "serpx_cli=trace,serpx_core=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None => {
            show_overview();
            Ok(())
        }
        Some(Commands::Search {
            query,
            lang,
            country,
            num,
            export,
            out_dir,
            no_cache,
        }) => {
            let opts = search::SearchOptions {
                lang: lang.as_deref(),
                country: country.as_deref(),
                num: *num,
                exports: export,
                out_dir,
                no_cache: *no_cache,
            };
            search::run(&cli, query, opts).await
        }
        Some(Commands::Export {
            input,
            format,
            query,
            out,
        }) => export::run(&cli, input, format, query, out.as_deref()),
        Some(Commands::Format) => export::list_formats(&cli),
        Some(Commands::Languages) => search::list_languages(&cli),
        Some(Commands::Config { action }) => config::run(&cli, action.clone()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".paint_err(Style::new().red().bold()), e);
        process::exit(exit_code(&e));
    }
}

fn show_overview() {
    let heading = Style::new().bold().cyan();
    let command = Style::new().cyan();
    let note = Style::new().dimmed();

    println!();
    println!(
        "{}  {}",
        "serpx".paint(heading),
        "- Web search with JSON, CSV and text export".paint(note)
    );
    println!();
    println!("{}", "Quick Start:".paint(heading));
    println!(
        "  {}{}",
        "serpx search \"query\"".paint(command),
        "                 Search and show results".paint(note)
    );
    println!(
        "  {}{}",
        "serpx search \"query\" -e json,csv".paint(command),
        "     Search and save exports".paint(note)
    );
    println!(
        "  {}{}",
        "serpx config set-key".paint(command),
        "                 Store your Google API key".paint(note)
    );
    println!();
    println!(
        "{} Use {} for full help",
        "Tip:".paint(note),
        "serpx --help".paint(command)
    );
    println!();
}
