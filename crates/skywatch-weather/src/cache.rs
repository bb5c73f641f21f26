//! File-backed cache for weather responses with a fixed time-to-live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    payload: serde_json::Value,
}

#[derive(Debug)]
pub struct ForecastCache {
    cache_path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl ForecastCache {
    /// Open the cache in `config_dir`. A missing or unreadable file starts empty.
    pub fn open(config_dir: &Path, ttl: Duration) -> Self {
        let cache_path = config_dir.join("weather_cache.json");
        let entries = match std::fs::read_to_string(&cache_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt weather cache {}: {}", cache_path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            cache_path,
            ttl,
            entries,
        }
    }

    pub fn forecast_key(location: &str, days: u8) -> String {
        format!("forecast:{}:{}", location.trim().to_lowercase(), days)
    }

    pub fn current_key(location: &str) -> String {
        format!("current:{}", location.trim().to_lowercase())
    }

    /// A zero TTL disables the cache
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fresh cached value for `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }

        let entry = self.entries.get(key)?;
        if !self.is_fresh(entry, now) {
            tracing::debug!("Cache expired for {}", key);
            return None;
        }

        match serde_json::from_value(entry.payload.clone()) {
            Ok(value) => {
                tracing::debug!("Cache hit for {}", key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Cached entry {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Store a value and write the cache file. Expired entries are dropped.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), WeatherError> {
        self.put_at(key, value, Utc::now())
    }

    fn put_at<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), WeatherError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let payload = serde_json::to_value(value).map_err(|e| WeatherError::Cache(e.to_string()))?;

        let ttl = self.ttl;
        self.entries.retain(|_, entry| is_fresh(ttl, entry, now));
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                fetched_at: now,
                payload,
            },
        );

        self.persist()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        is_fresh(self.ttl, entry, now)
    }

    fn persist(&self) -> Result<(), WeatherError> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WeatherError::Cache(e.to_string()))?;
        }

        let contents =
            serde_json::to_string(&self.entries).map_err(|e| WeatherError::Cache(e.to_string()))?;
        std::fs::write(&self.cache_path, contents).map_err(|e| WeatherError::Cache(e.to_string()))
    }
}

// Entries dated in the future count as stale
fn is_fresh(ttl: Duration, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(entry.fetched_at)
        .to_std()
        .map(|age| age < ttl)
        .unwrap_or(false)
}
