//! User configuration stored as TOML.
//!
//! Lives at `~/.config/serpx/config.toml` (Unix) or
//! `%APPDATA%/serpx/config.toml` (Windows). `GOOGLE_API_KEY` and
//! `GOOGLE_CX` take precedence over the file.

use crate::cache::DEFAULT_TTL;
use crate::error::{Result, SerpxError};
use crate::locale::Locale;
use crate::search::{SearchCredentials, DEFAULT_RESULTS, MAX_RESULTS};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpxConfig {
    pub google: GoogleSection,
    pub search: SearchSection,
    pub cache: CacheSection,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cx: Option<String>,
}

impl std::fmt::Debug for GoogleSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("cx", &self.cx)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub language: String,
    /// Overrides the country derived from `language`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub num: u8,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            language: Locale::default().language().to_string(),
            country: None,
            num: DEFAULT_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl SerpxConfig {
    /// Credentials from the environment, falling back to the file.
    pub fn credentials(&self) -> SearchCredentials {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    /// Like [`credentials`](Self::credentials) with a custom variable lookup.
    /// Blank variables do not override the file.
    fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> SearchCredentials {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key = var("GOOGLE_API_KEY")
            .or_else(|| self.google.api_key.clone())
            .unwrap_or_default();
        let cx = var("GOOGLE_CX")
            .or_else(|| self.google.cx.clone())
            .unwrap_or_default();
        SearchCredentials::new(api_key, cx)
    }

    pub fn locale(&self) -> Locale {
        match &self.search.country {
            Some(country) => Locale::with_country(&self.search.language, country),
            None => Locale::from_language(&self.search.language),
        }
    }

    /// Update one dotted key such as `search.language` from a string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "google.api_key" => self.google.api_key = Some(value.to_string()),
            "google.cx" => self.google.cx = Some(value.to_string()),
            "search.language" => self.search.language = value.trim().to_ascii_lowercase(),
            "search.country" => {
                self.search.country = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().to_ascii_uppercase())
                }
            }
            "search.num" => {
                let num: u8 = value.trim().parse().map_err(|_| {
                    SerpxError::InvalidParams(format!("search.num must be a number, got '{}'", value))
                })?;
                if !(1..=MAX_RESULTS).contains(&num) {
                    return Err(SerpxError::InvalidParams(format!(
                        "search.num must be between 1 and {}",
                        MAX_RESULTS
                    )));
                }
                self.search.num = num;
            }
            "cache.enabled" => {
                self.cache.enabled = value.trim().parse().map_err(|_| {
                    SerpxError::InvalidParams(format!("cache.enabled must be true or false, got '{}'", value))
                })?
            }
            "cache.ttl_secs" => {
                self.cache.ttl_secs = value.trim().parse().map_err(|_| {
                    SerpxError::InvalidParams(format!("cache.ttl_secs must be a number, got '{}'", value))
                })?
            }
            other => {
                return Err(SerpxError::InvalidParams(format!(
                    "Unknown config key '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("serpx").join("config.toml"),
        }
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config. A missing file yields defaults.
    pub fn load(&self) -> Result<SerpxConfig> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                SerpxError::Config(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SerpxConfig::default()),
            Err(e) => Err(SerpxError::Io(e)),
        }
    }

    pub fn save(&self, config: &SerpxConfig) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(config)
            .map_err(|e| SerpxError::Config(format!("serialize: {}", e)))?;
        write_private(&self.path, content.as_bytes())
    }
}

/// Write a file readable by the owner only. New files are created 0600;
/// an existing file is narrowed to 0600 before it is truncated.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.set_len(0)?;
    file.write_all(contents)?;
    Ok(())
}
