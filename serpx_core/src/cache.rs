//! Response cache for the search collaborator.
//!
//! Raw responses are cached by request parameters for a fixed time-to-live.
//! The cache sits in front of a [`SearchBackend`]; normalization and export
//! never see it. [`FileResponseCache`] keeps entries between CLI runs,
//! [`MemoryResponseCache`] only for the life of the process.

use crate::error::{Result, SerpxError};
use crate::search::{SearchBackend, SearchRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Normalized request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub query: String,
    pub num: u8,
    pub language: String,
    pub country: String,
}

impl From<&SearchRequest> for CacheKey {
    fn from(request: &SearchRequest) -> Self {
        Self {
            query: request.query().to_string(),
            num: request.num(),
            language: request.locale().language().to_string(),
            country: request.locale().country().to_string(),
        }
    }
}

pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Value>;
    fn put(&self, key: CacheKey, value: Value);
}

/// In-memory cache with fixed TTL. Expired entries are dropped on lookup.
pub struct MemoryResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, Value)>>,
}

impl MemoryResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut map = self.entries.lock().ok()?;
        match map.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, value: Value) {
        if let Ok(mut map) = self.entries.lock() {
            let ttl = self.ttl;
            map.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
            map.insert(key, (Instant::now(), value));
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredResponse {
    key: CacheKey,
    stored_at: DateTime<Utc>,
    response: Value,
}

/// Cache persisted as one JSON file, so entries survive between runs.
///
/// Expired entries are dropped whenever the file is rewritten. An unreadable
/// file counts as empty; write failures are logged and otherwise ignored.
pub struct FileResponseCache {
    path: PathBuf,
    ttl: Duration,
    lock: Mutex<()>,
}

impl FileResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: dir.into().join("responses.json"),
            ttl,
            lock: Mutex::new(()),
        }
    }

    /// Cache under the platform cache directory (`~/.cache/serpx` on Linux).
    pub fn new_default(ttl: Duration) -> Option<Self> {
        dirs::cache_dir().map(|base| Self::new(base.join("serpx"), ttl))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_fresh(&self, entry: &StoredResponse, now: DateTime<Utc>) -> bool {
        // negative ages (clock moved back) fail to_std and count as expired
        now.signed_duration_since(entry.stored_at)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(false)
    }

    fn read_entries(&self) -> Vec<StoredResponse> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::debug!(path = %self.path.display(), error = %e, "ignoring unreadable response cache");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    fn write_entries(&self, entries: &[StoredResponse]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let s = serde_json::to_string(entries)?;
        // replace atomically so a concurrent reader never sees half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, s)?;
        std::fs::rename(&tmp, &self.path).map_err(SerpxError::Io)
    }
}

impl ResponseCache for FileResponseCache {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        let _guard = self.lock.lock().ok()?;
        let now = Utc::now();
        self.read_entries()
            .into_iter()
            .find(|entry| &entry.key == key && self.is_fresh(entry, now))
            .map(|entry| entry.response)
    }

    fn put(&self, key: CacheKey, value: Value) {
        let Ok(_guard) = self.lock.lock() else {
            return;
        };
        let now = Utc::now();
        let mut entries = self.read_entries();
        entries.retain(|entry| entry.key != key && self.is_fresh(entry, now));
        entries.push(StoredResponse {
            key,
            stored_at: now,
            response: value,
        });
        if let Err(e) = self.write_entries(&entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write response cache");
        }
    }
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResponseCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<Value> {
        None
    }
    fn put(&self, _key: CacheKey, _value: Value) {}
}

/// A search backend with a response cache in front of it.
pub struct CachedSearch<B> {
    backend: B,
    cache: Box<dyn ResponseCache>,
}

impl<B: SearchBackend> CachedSearch<B> {
    pub fn new(backend: B, cache: Box<dyn ResponseCache>) -> Self {
        Self { backend, cache }
    }
}

#[async_trait]
impl<B: SearchBackend> SearchBackend for CachedSearch<B> {
    fn name(&self) -> &'static str {
        self.backend.name()
    }

    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let key = CacheKey::from(request);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(query = %key.query, locale = %request.locale(), "response cache hit");
            return Ok(hit);
        }
        let value = self.backend.search(request).await?;
        self.cache.put(key, value.clone());
        Ok(value)
    }
}
