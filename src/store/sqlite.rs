//! SQLite-backed `Store`. One connection, one global critical section —
//! the DSL issues at most one statement at a time per session, and
//! sessions are infrequent enough that serializing them behind a mutex is
//! simpler than pooling connections.

use std::sync::Mutex;

use rusqlite::Connection;

use super::{Store, StoreError};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run a batch of DDL/seed statements, e.g. at startup from a schema
    /// file. Not part of the `Store` trait: callers that need this know
    /// they're holding a `SqliteStore`, not a `&dyn Store`.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn execute(&self, sql: &str, params: &[String]) -> Result<i64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let bound: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
        let rows = conn.execute(sql, bound.as_slice())?;
        Ok(rows as i64)
    }

    fn fetch_scalar(&self, sql: &str, params: &[String]) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let bound: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(bound.as_slice())?;
        match rows.next()? {
            Some(row) => {
                // The first column may be any SQLite storage class (a bot
                // schema is author-defined); normalize every non-null kind
                // to its textual form rather than assuming TEXT.
                let value: rusqlite::types::Value = row.get(0)?;
                Ok(match value {
                    rusqlite::types::Value::Null => None,
                    rusqlite::types::Value::Integer(i) => Some(i.to_string()),
                    rusqlite::types::Value::Real(f) => Some(format!("{f:.2}")),
                    rusqlite::types::Value::Text(s) => Some(s),
                    rusqlite::types::Value::Blob(_) => Some(String::new()),
                })
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT, balance REAL);
                 INSERT INTO customers (id, name, balance) VALUES (1, 'Ada', 100.0);",
            )
            .unwrap();
        store
    }

    #[test]
    fn fetch_scalar_returns_first_column() {
        let store = seeded();
        let name = store
            .fetch_scalar("SELECT name FROM customers WHERE id = ?", &["1".to_string()])
            .unwrap();
        assert_eq!(name, Some("Ada".to_string()));
    }

    #[test]
    fn fetch_scalar_returns_none_for_no_rows() {
        let store = seeded();
        let name = store
            .fetch_scalar("SELECT name FROM customers WHERE id = ?", &["99".to_string()])
            .unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn execute_returns_affected_row_count() {
        let store = seeded();
        let affected = store
            .execute("UPDATE customers SET balance = ? WHERE id = ?", &["50.0".to_string(), "1".to_string()])
            .unwrap();
        assert_eq!(affected, 1);
    }
}
