//! SQL binder (C5): rewrites `$variable` placeholders embedded in a `sql`
//! instruction's query text into positional `?` placeholders bound against
//! the session's context, then dispatches to the store as either a
//! mutation or a scalar fetch depending on the statement's leading
//! keyword.

pub mod binder;

pub use binder::{bind_query, classify, execute_sql, StatementKind};
