use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData, Paint};
use owo_colors::Style;
use serde_json::{json, Value};
use serpx_core::config::ConfigStore;
use serpx_core::SerpxConfig;
use std::io::{self, Write};

pub fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    let store = ConfigStore::new_default();
    match action {
        ConfigAction::Show => show_config(cli, &store),
        ConfigAction::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        ConfigAction::Set { key, value } => set_config(&store, &key, &value),
        ConfigAction::SetKey => set_api_key(&store),
    }
}

fn show_config(cli: &Cli, store: &ConfigStore) -> Result<()> {
    let config = store.load()?;
    let masked = masked_config_json(&config);

    match cli.output {
        OutputFormat::Pretty => {
            println!();
            println!("{}", "serpx Configuration".paint(Style::new().bold().cyan()));
            println!("{}", "===================".paint(Style::new().cyan()));
            println!();
            println!("Config file: {}", store.path().display().paint(Style::new().dimmed()));
            println!();

            let creds = config.credentials();
            let status = if creds.is_complete() {
                "configured".paint(Style::new().green())
            } else {
                "missing".paint(Style::new().yellow())
            };
            println!("  {} {}", "google credentials:".paint(Style::new().bold()), status);
            println!(
                "  {} {}",
                "locale:".paint(Style::new().bold()),
                config.locale().paint(Style::new().cyan())
            );
            println!("  {} {}", "results:".paint(Style::new().bold()), config.search.num);
            println!(
                "  {} {}",
                "cache:".paint(Style::new().bold()),
                if config.cache.enabled {
                    format!("on, {}s TTL", config.cache.ttl_secs)
                } else {
                    "off".to_string()
                }
            );
            println!();
            if !creds.is_complete() {
                println!(
                    "Set credentials with {} and {}",
                    "serpx config set-key".paint(Style::new().cyan()),
                    "serpx config set google.cx <id>".paint(Style::new().cyan())
                );
                println!();
            }
        }
        _ => format_output(&OutputData::ConfigInfo(masked), &cli.output)?,
    }
    Ok(())
}

fn masked_config_json(config: &SerpxConfig) -> Value {
    let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
    json!({
        "google": {
            "api_key": mask(&config.google.api_key),
            "cx": config.google.cx,
        },
        "search": {
            "language": config.search.language,
            "country": config.locale().country(),
            "num": config.search.num,
        },
        "cache": {
            "enabled": config.cache.enabled,
            "ttl_secs": config.cache.ttl_secs,
        },
    })
}

fn set_config(store: &ConfigStore, key: &str, value: &str) -> Result<()> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;

    let shown = if key == "google.api_key" { "***" } else { value };
    println!(
        "{} {} = {}",
        "Saved".paint(Style::new().green().bold()),
        key.paint(Style::new().cyan()),
        shown
    );
    Ok(())
}

fn set_api_key(store: &ConfigStore) -> Result<()> {
    print!("Google API key: ");
    io::stdout().flush()?;
    let key = read_secret()?;
    if key.is_empty() {
        return Err(CommandError::InvalidConfig("API key must not be empty".into()));
    }
    set_config(store, "google.api_key", &key)
}

fn read_secret() -> Result<String> {
    match rpassword::read_password() {
        Ok(secret) => Ok(secret.trim().to_string()),
        Err(_) => {
            // Not a TTY: read a plain line instead
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Ok(input.trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_json_hides_api_key() {
        let mut config = SerpxConfig::default();
        config.set("google.api_key", "super-secret").unwrap();
        config.set("google.cx", "engine").unwrap();
        let value = masked_config_json(&config);
        assert_eq!(value["google"]["api_key"], "***");
        assert_eq!(value["google"]["cx"], "engine");
        assert!(!value.to_string().contains("super-secret"));
        assert_eq!(value["search"]["country"], "CZ");
    }
}
