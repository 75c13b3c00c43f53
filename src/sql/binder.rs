use crate::runtime::Context;
use crate::store::Store;

/// Whether a bound statement reads or writes. Decided purely from the
/// first keyword — the DSL doesn't support multi-statement scripts or
/// CTEs, so this never needs a real SQL parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Mutation,
}

pub fn classify(sql: &str) -> StatementKind {
    let first_word = sql.trim_start().split_whitespace().next().unwrap_or("");
    if first_word.eq_ignore_ascii_case("select") {
        StatementKind::Select
    } else {
        StatementKind::Mutation
    }
}

/// Scan `query` left to right for `$identifier` placeholders, replacing
/// each with a positional `?` and recording its resolved value in
/// discovery order, so the n-th `?` corresponds to the n-th param.
pub fn bind_query(query: &str, ctx: &Context) -> (String, Vec<String>) {
    let mut sql = String::with_capacity(query.len());
    let mut params = Vec::new();
    let chars: Vec<char> = query.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            if end > start {
                let name: String = chars[start..end].iter().collect();
                params.push(ctx.get(&format!("${name}")));
                sql.push('?');
                i = end;
                continue;
            }
        }
        sql.push(chars[i]);
        i += 1;
    }

    (sql, params)
}

/// Run a bound `sql` instruction's query. Any failure — a bad statement, a
/// missing table, a poisoned connection — is swallowed to a sentinel
/// rather than propagated: a script author has no way to catch a runtime
/// error, so the only sane behavior is to hand back a value the DSL can
/// still branch on.
pub fn execute_sql(store: &dyn Store, query: &str, ctx: &Context) -> String {
    let (sql, params) = bind_query(query, ctx);
    match classify(&sql) {
        StatementKind::Select => match store.fetch_scalar(&sql, &params) {
            Ok(Some(value)) => value,
            Ok(None) => "0".to_string(),
            Err(err) => {
                tracing::warn!(error = %err, sql = %sql, "sql fetch failed; returning sentinel");
                "0".to_string()
            }
        },
        StatementKind::Mutation => match store.execute(&sql, &params) {
            Ok(rows) => rows.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, sql = %sql, "sql mutation failed; returning sentinel");
                "0".to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    #[test]
    fn classifies_select_case_insensitively() {
        assert_eq!(classify("  Select 1"), StatementKind::Select);
        assert_eq!(classify("UPDATE t SET x = 1"), StatementKind::Mutation);
    }

    #[test]
    fn binds_placeholders_in_discovery_order() {
        let mut ctx = Context::new();
        ctx.set("$id", "7");
        ctx.set("$name", "Ada");
        let (sql, params) = bind_query("SELECT * FROM t WHERE id = $id AND name = $name", &ctx);
        assert_eq!(sql, "SELECT * FROM t WHERE id = ? AND name = ?");
        assert_eq!(params, vec!["7".to_string(), "Ada".to_string()]);
    }

    #[test]
    fn execute_sql_returns_sentinel_on_missing_table() {
        let store = SqliteStore::in_memory().unwrap();
        let ctx = Context::new();
        let result = execute_sql(&store, "SELECT name FROM nope", &ctx);
        assert_eq!(result, "0");
    }

    #[test]
    fn execute_sql_fetches_scalar_from_seeded_table() {
        let store = SqliteStore::in_memory().unwrap();
        store.execute_batch("CREATE TABLE t (name TEXT); INSERT INTO t VALUES ('Ada')").unwrap();
        let ctx = Context::new();
        let result = execute_sql(&store, "SELECT name FROM t", &ctx);
        assert_eq!(result, "Ada");
    }

    #[test]
    fn execute_sql_returns_sentinel_on_failed_mutation() {
        let store = SqliteStore::in_memory().unwrap();
        let ctx = Context::new();
        let result = execute_sql(&store, "UPDATE nope SET x = 1", &ctx);
        assert_eq!(result, "0");
    }
}
