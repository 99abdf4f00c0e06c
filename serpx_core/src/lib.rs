// src/lib.rs
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod locale;
pub mod normalize;
pub mod record;
pub mod search;

pub use crate::cache::{
    CacheKey, CachedSearch, FileResponseCache, MemoryResponseCache, NoCache, ResponseCache,
};
pub use crate::config::{ConfigStore, SerpxConfig};
pub use crate::error::SerpxError;
pub use crate::export::{
    csv_export_available, export, export_records, to_csv, to_json, to_text, to_text_at,
    ExportBlob, ExportFormat,
};
pub use crate::locale::{Language, Locale};
pub use crate::normalize::{normalize, normalize_str, normalize_value, RawInput};
pub use crate::record::SearchRecord;
pub use crate::search::{
    redacted_url, GoogleSearchConnector, SearchBackend, SearchCredentials, SearchRequest,
};

use std::time::Duration;

/// Build the search backend described by `config`, with the response
/// cache in front of it unless caching is disabled.
///
/// The cache is persisted under the user cache directory so repeated CLI
/// runs share it. Without a cache directory it only lives in memory.
pub fn build_search(config: &SerpxConfig) -> Result<CachedSearch<GoogleSearchConnector>, SerpxError> {
    let connector = GoogleSearchConnector::new(config.credentials())?;
    Ok(CachedSearch::new(connector, response_cache(config)))
}

fn response_cache(config: &SerpxConfig) -> Box<dyn ResponseCache> {
    if !config.cache.enabled {
        return Box::new(NoCache);
    }
    let ttl = Duration::from_secs(config.cache.ttl_secs);
    match FileResponseCache::new_default(ttl) {
        Some(cache) => {
            tracing::debug!(path = %cache.path().display(), ?ttl, "using response cache");
            Box::new(cache)
        }
        None => {
            tracing::debug!("no cache directory, response cache is in-memory only");
            Box::new(MemoryResponseCache::new(ttl))
        }
    }
}
