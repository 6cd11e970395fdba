use rusqlite::{Connection, Result as SqlResult, Transaction};
use std::path::Path;

/// Tables backing durable client state.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS local_storage (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );
";

/// SQLite file holding the client's durable state, with its schema applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let path = path.as_ref();
        log::debug!("Opening client storage at {}", path.display());
        Self::prepare(Connection::open(path)?)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `work` in one transaction, committed only when it succeeds.
    pub fn write<T>(&mut self, work: impl FnOnce(&Transaction<'_>) -> SqlResult<T>) -> SqlResult<T> {
        let tx = self.conn.transaction()?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &Database) -> i64 {
        db.connection()
            .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn schema_is_ready_after_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");
        Database::open(&path).unwrap();
        // reopening an existing file keeps working
        let db = Database::open(&path).unwrap();
        assert_eq!(count(&db), 0);
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut db = Database::in_memory().unwrap();
        let result: SqlResult<()> = db.write(|tx| {
            tx.execute(
                "INSERT INTO local_storage (key, value) VALUES ('token', 't1')",
                [],
            )?;
            tx.execute("INSERT INTO missing_table (key) VALUES ('x')", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(count(&db), 0);
    }
}
