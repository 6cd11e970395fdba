use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::database::Database;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";
pub const THEME_KEY: &str = "theme";

/// String key/value storage that survives restarts, in the spirit of
/// browser local storage.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    pub fn in_memory() -> SqlResult<Self> {
        Ok(Self {
            db: Database::in_memory()?,
        })
    }

    pub fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.db.connection().execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> SqlResult<()> {
        self.db
            .connection()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Writes every entry or none of them.
    pub fn set_many(&mut self, entries: &[(&str, &str)]) -> SqlResult<()> {
        self.db.write(|tx| {
            for (key, value) in entries {
                tx.execute(
                    "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%s', 'now'))",
                    params![key, value],
                )?;
            }
            Ok(())
        })
    }

    /// Removes every key or none of them.
    pub fn remove_many(&mut self, keys: &[&str]) -> SqlResult<()> {
        self.db.write(|tx| {
            for key in keys {
                tx.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = LocalStore::in_memory().unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        store.set(THEME_KEY, "dark").unwrap();
        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        store.remove(THEME_KEY).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn set_many_and_remove_many_touch_only_named_keys() {
        let mut store = LocalStore::in_memory().unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        store
            .set_many(&[(TOKEN_KEY, "t1"), (USERNAME_KEY, "alice")])
            .unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert_eq!(store.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));

        store.remove_many(&[TOKEN_KEY, USERNAME_KEY]).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USERNAME_KEY).unwrap(), None);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }
}
