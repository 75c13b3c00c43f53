//! Relational persistence (back half of C5): a narrow trait the SQL binder
//! drives, and one concrete implementation backed by SQLite.

pub mod errors;
pub mod sqlite;

pub use errors::StoreError;
pub use sqlite::SqliteStore;

/// A store's entire contract: run a mutation, or fetch one scalar. Bound
/// parameters are always text — the DSL has no typed literals beyond
/// strings and integers, both of which round-trip fine as text bindings
/// against SQLite's dynamic typing.
pub trait Store: Send + Sync {
    /// Run an INSERT/UPDATE/DELETE and return the number of rows affected.
    fn execute(&self, sql: &str, params: &[String]) -> Result<i64, StoreError>;

    /// Run a SELECT and return the first column of its first row, if any.
    fn fetch_scalar(&self, sql: &str, params: &[String]) -> Result<Option<String>, StoreError>;
}
