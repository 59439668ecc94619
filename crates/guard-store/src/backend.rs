//! Pluggable persistence for the profile table.
//!
//! A backend stores opaque record payloads keyed by guid plus a small
//! metadata key/value area (display order, selection, clock watermark).
//! Payloads arrive already sealed; a backend never sees plaintext records.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::error::StoreError;

pub trait StorageBackend: Send + Sync {
    /// Insert or replace one record payload.
    fn put_record(&self, guid: &str, payload: &str) -> Result<(), StoreError>;

    /// Delete one record. Deleting an absent guid is not an error.
    fn delete_record(&self, guid: &str) -> Result<(), StoreError>;

    /// All stored records in insertion order.
    fn load_records(&self) -> Result<Vec<(String, String)>, StoreError>;

    fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ============================================================================
// SqliteBackend
// ============================================================================

/// SQLite-backed storage, the native default. One bundled connection behind
/// a mutex; the store above already serializes writers, the mutex makes the
/// backend safe to share with the clock watermark writer.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Ephemeral database, handy for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                guid TEXT PRIMARY KEY,
                payload TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StorageBackend for SqliteBackend {
    fn put_record(&self, guid: &str, payload: &str) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO profiles (guid, payload) VALUES (?1, ?2)
             ON CONFLICT(guid) DO UPDATE SET payload = excluded.payload",
            params![guid, payload],
        )?;
        Ok(())
    }

    fn delete_record(&self, guid: &str) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("DELETE FROM profiles WHERE guid = ?1", params![guid])?;
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT guid, payload FROM profiles ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result = self.conn.lock().query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory storage for tests and ephemeral use. Records keep insertion
/// order the way the SQLite backend does.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<(String, String)>>,
    meta: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn put_record(&self, guid: &str, payload: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|(g, _)| g == guid) {
            Some((_, existing)) => *existing = payload.to_string(),
            None => records.push((guid.to_string(), payload.to_string())),
        }
        Ok(())
    }

    fn delete_record(&self, guid: &str) -> Result<(), StoreError> {
        self.records.lock().retain(|(g, _)| g != guid);
        Ok(())
    }

    fn load_records(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.records.lock().clone())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.meta.lock().get(key).cloned())
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.meta.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
