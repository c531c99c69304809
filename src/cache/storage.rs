//! Cache storage trait with SQLite and in-memory implementations.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::Response;

/// A single cached response with its storage timestamp.
#[derive(Debug, Clone)]
pub struct CachedEntry {
  /// The stored response
  pub response: Response,
  /// When the response was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Entries live under a named generation; writes are last-write-wins per
/// (generation, key) pair.
pub trait CacheStorage: Send + Sync {
  /// Look up a stored response by generation and request key.
  fn get(&self, generation: &str, key: &str) -> Result<Option<CachedEntry>>;

  /// Store a response under the given generation and request key,
  /// overwriting any previous entry.
  fn put(&self, generation: &str, key: &str, response: &Response) -> Result<()>;

  /// Delete a whole generation and every entry in it.
  fn delete_generation(&self, generation: &str) -> Result<()>;

  /// Names of all generations that currently hold entries.
  fn list_generations(&self) -> Result<Vec<String>>;
}

/// In-memory storage backend. Used in tests and anywhere persistence
/// across runs is not wanted.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<(String, String), CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, generation: &str, key: &str) -> Result<Option<CachedEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(
      entries
        .get(&(generation.to_string(), key.to_string()))
        .cloned(),
    )
  }

  fn put(&self, generation: &str, key: &str, response: &Response) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(
      (generation.to_string(), key.to_string()),
      CachedEntry {
        response: response.clone(),
        cached_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn delete_generation(&self, generation: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.retain(|(gen, _), _| gen != generation);
    Ok(())
  }

  fn list_generations(&self) -> Result<Vec<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let mut generations: Vec<String> = entries.keys().map(|(gen, _)| gen.clone()).collect();
    generations.sort();
    generations.dedup();
    Ok(generations)
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Create a storage backed by an in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("internconnect").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Cached responses keyed by generation + request identity
CREATE TABLE IF NOT EXISTS response_cache (
    generation TEXT NOT NULL,
    request_key TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, request_key)
);

CREATE INDEX IF NOT EXISTS idx_response_cache_generation
    ON response_cache(generation);
"#;

impl CacheStorage for SqliteStorage {
  fn get(&self, generation: &str, key: &str) -> Result<Option<CachedEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT status, headers, body, cached_at FROM response_cache
         WHERE generation = ? AND request_key = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(u16, String, Vec<u8>, String)> = stmt
      .query_row(params![generation, key], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      })
      .ok();

    match row {
      Some((status, headers_json, body, cached_at_str)) => {
        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
          .map_err(|e| eyre!("Failed to deserialize cached headers: {}", e))?;
        let cached_at = parse_datetime(&cached_at_str)?;
        Ok(Some(CachedEntry {
          response: Response {
            status,
            headers,
            body,
          },
          cached_at,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, generation: &str, key: &str, response: &Response) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let headers = serde_json::to_string(&response.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache (generation, request_key, status, headers, body, cached_at)
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
        params![generation, key, response.status, headers, response.body],
      )
      .map_err(|e| eyre!("Failed to store response: {}", e))?;

    Ok(())
  }

  fn delete_generation(&self, generation: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM response_cache WHERE generation = ?",
        params![generation],
      )
      .map_err(|e| eyre!("Failed to delete generation: {}", e))?;

    Ok(())
  }

  fn list_generations(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT generation FROM response_cache ORDER BY generation")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let generations: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list generations: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(generations)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_response() -> Response {
    Response {
      status: 200,
      headers: vec![("Content-Type".to_string(), "text/html".to_string())],
      body: b"<!doctype html>".to_vec(),
    }
  }

  fn roundtrip(storage: &dyn CacheStorage) {
    assert!(storage.get("v1", "key").unwrap().is_none());

    storage.put("v1", "key", &sample_response()).unwrap();
    let entry = storage.get("v1", "key").unwrap().unwrap();
    assert_eq!(entry.response, sample_response());

    // Other generations do not see the entry
    assert!(storage.get("v2", "key").unwrap().is_none());
  }

  fn last_write_wins(storage: &dyn CacheStorage) {
    storage.put("v1", "key", &sample_response()).unwrap();

    let replacement = Response {
      status: 200,
      headers: Vec::new(),
      body: b"updated".to_vec(),
    };
    storage.put("v1", "key", &replacement).unwrap();

    let entry = storage.get("v1", "key").unwrap().unwrap();
    assert_eq!(entry.response.body, b"updated".to_vec());
  }

  fn generation_lifecycle(storage: &dyn CacheStorage) {
    storage.put("v1", "a", &sample_response()).unwrap();
    storage.put("v1", "b", &sample_response()).unwrap();
    storage.put("v2", "a", &sample_response()).unwrap();

    assert_eq!(
      storage.list_generations().unwrap(),
      vec!["v1".to_string(), "v2".to_string()]
    );

    storage.delete_generation("v1").unwrap();
    assert_eq!(storage.list_generations().unwrap(), vec!["v2".to_string()]);
    assert!(storage.get("v1", "a").unwrap().is_none());
    assert!(storage.get("v2", "a").unwrap().is_some());
  }

  #[test]
  fn test_memory_roundtrip() {
    roundtrip(&MemoryStorage::new());
  }

  #[test]
  fn test_memory_last_write_wins() {
    last_write_wins(&MemoryStorage::new());
  }

  #[test]
  fn test_memory_generation_lifecycle() {
    generation_lifecycle(&MemoryStorage::new());
  }

  #[test]
  fn test_sqlite_roundtrip() {
    roundtrip(&SqliteStorage::open_in_memory().unwrap());
  }

  #[test]
  fn test_sqlite_last_write_wins() {
    last_write_wins(&SqliteStorage::open_in_memory().unwrap());
  }

  #[test]
  fn test_sqlite_generation_lifecycle() {
    generation_lifecycle(&SqliteStorage::open_in_memory().unwrap());
  }
}
