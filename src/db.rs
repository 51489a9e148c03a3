mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use schema::INITIAL_SCHEMA;

/// How long a writer waits for a competing connection to release its lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper providing connection management and schema initialization.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Several connections may be opened on the same file; writers wait on
    /// each other instead of failing immediately.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_opens_successfully() {
        let result = Database::in_memory();
        assert!(result.is_ok());
    }

    #[test]
    fn schema_tables_exist() {
        let db = Database::in_memory().unwrap();

        let tables: Vec<String> = db
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"tags".to_string()));
        assert!(tables.contains(&"tag_stats".to_string()));
        assert!(tables.contains(&"status_tags".to_string()));
        assert!(tables.contains(&"account_tags".to_string()));
    }

    #[test]
    fn foreign_keys_enabled() {
        let db = Database::in_memory().unwrap();

        let fk_enabled: i32 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn normalized_name_is_unique() {
        let db = Database::in_memory().unwrap();
        let conn = db.connection();

        conn.execute(
            "INSERT INTO tags (name, normalized_name, created_at, updated_at) VALUES ('Rust', 'rust', 0, 0)",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO tags (name, normalized_name, created_at, updated_at) VALUES ('RUST', 'rust', 0, 0)",
            [],
        );

        assert!(duplicate.is_err());
    }

    #[test]
    fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.connection()
                .execute(
                    "INSERT INTO tags (name, normalized_name, created_at, updated_at) VALUES ('rust', 'rust', 0, 0)",
                    [],
                )
                .unwrap();
        }

        let db2 = Database::open(&db_path);
        assert!(db2.is_ok());

        let count: i32 = db2
            .unwrap()
            .connection()
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
