//! Key-value response cache with per-entry TTL.
//!
//! Stores are string-keyed and string-valued; the lookup pipeline decides
//! what goes in them. Expiry is enforced by the store on read.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache storage error: {0}")]
    Storage(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Storage(e.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Single-key get/set store with TTL eviction.
pub trait CacheStore {
    /// Fetch a live entry. Expired entries are reported as absent.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Insert or replace an entry that expires after `ttl`.
    fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for Box<T> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()> {
        (**self).set(key, payload, ttl)
    }
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

/// SQLite-backed cache that survives across process runs.
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init_schema()?;

        let purged = cache.purge_expired()?;
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }

        Ok(cache)
    }

    /// Create an in-memory cache (for testing).
    #[cfg(test)]
    pub fn in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> CacheResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                expires_at_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_expires ON entries(expires_at_ms);
            "#,
        )?;
        Ok(())
    }

    /// Delete every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> CacheResult<usize> {
        let now = Utc::now().timestamp_millis();
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE expires_at_ms <= ?1", params![now])?;
        Ok(removed)
    }

    /// Number of stored rows, expired or not.
    pub fn len(&self) -> CacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl CacheStore for SqliteCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT payload, expires_at_ms FROM entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((payload, expires_at_ms)) = row else {
            return Ok(None);
        };

        if expires_at_ms <= Utc::now().timestamp_millis() {
            self.conn
                .execute("DELETE FROM entries WHERE key = ?1", params![key])?;
            return Ok(None);
        }

        Ok(Some(payload))
    }

    fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at_ms = Utc::now()
            .timestamp_millis()
            .saturating_add(ttl_millis(ttl));

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO entries (key, payload, expires_at_ms)
            VALUES (?1, ?2, ?3)
            "#,
            params![key, payload, expires_at_ms],
        )?;
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryEntry {
    payload: String,
    /// `None` when the TTL is too large to represent
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Process-local cache. Used when the SQLite file is unavailable.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.payload.clone())),
            Some(_) => {}
        }

        entries.remove(key);
        Ok(None)
    }

    fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()> {
        let entry = MemoryEntry {
            payload: payload.to_string(),
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }
}
