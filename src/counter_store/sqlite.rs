use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use super::CounterStore;
use crate::error::StoreError;
use crate::hll::HyperLogLog;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activity_counters (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_sketches (
    key TEXT PRIMARY KEY,
    registers BLOB NOT NULL
);
"#;

/// Counter store persisted in SQLite.
///
/// May share a file with [`Database`](crate::Database). Read-modify-write
/// operations run in immediate transactions, so several processes can
/// update the same keys safely.
pub struct SqliteCounterStore {
    conn: Mutex<Connection>,
}

impl SqliteCounterStore {
    /// Opens (creating if needed) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::with_connection(conn)
    }

    /// Opens a store that lives only as long as this value.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Closes the underlying connection, reporting any error on the way.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .into_inner()
            .close()
            .map_err(|(_, err)| StoreError::from(err))?;
        debug!("closed counter store");
        Ok(())
    }
}

impl CounterStore for SqliteCounterStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM activity_counters WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT value FROM activity_counters WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        let current = match current {
            Some(value) => value.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
                key: key.to_string(),
            })?,
            None => 0,
        };

        let next = current.checked_add(1).ok_or_else(|| StoreError::Overflow {
            key: key.to_string(),
        })?;
        tx.execute(
            "INSERT INTO activity_counters (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, next.to_string()),
        )?;
        tx.commit()?;
        Ok(next)
    }

    fn cardinality_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored: Option<Vec<u8>> = tx
            .query_row(
                "SELECT registers FROM activity_sketches WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        let mut sketch = match stored {
            Some(bytes) => decode(key, &bytes)?,
            None => HyperLogLog::new(),
        };

        let changed = sketch.insert(member);
        if changed {
            tx.execute(
                "INSERT INTO activity_sketches (key, registers) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET registers = excluded.registers",
                (key, sketch.as_bytes()),
            )?;
        }
        tx.commit()?;
        Ok(changed)
    }

    fn cardinality_count(&self, key: &str) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let stored: Option<Vec<u8>> = conn
            .query_row(
                "SELECT registers FROM activity_sketches WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(bytes) => Ok(decode(key, &bytes)?.count()),
            None => Ok(0),
        }
    }
}

fn decode(key: &str, bytes: &[u8]) -> Result<HyperLogLog, StoreError> {
    HyperLogLog::from_bytes(bytes).ok_or_else(|| StoreError::CorruptSketch {
        key: key.to_string(),
    })
}
