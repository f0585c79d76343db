//! Custom scalar functions registered on every connection.
//!
//! The set of predicates is data, not a side effect: a [`DbFunction`]
//! names the SQL identifier, its arity and the Rust implementation, and
//! connection setup walks the list.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::string_match::{author_name_distance, levenshtein};

/// A custom scalar predicate available inside generated SQL.
#[derive(Clone, Copy)]
pub struct DbFunction {
    /// Name of the function as it appears in SQL.
    pub name: &'static str,
    /// Number of arguments the function accepts.
    pub arity: i32,
    /// The implementation. All current predicates are string-distance
    /// functions of two arguments returning an integer.
    pub func: fn(&str, &str) -> usize,
}

/// The standard predicate set generated metadata queries may use.
pub fn standard_functions() -> Vec<DbFunction> {
    vec![
        DbFunction { name: "levenshtein", arity: 2, func: levenshtein },
        DbFunction { name: "author_name_distance", arity: 2, func: author_name_distance },
    ]
}

/// Register the given predicates on a connection.
pub fn register_functions(conn: &Connection, functions: &[DbFunction]) -> rusqlite::Result<()> {
    for f in functions {
        let func = f.func;
        conn.create_scalar_function(
            f.name,
            f.arity,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            move |ctx| {
                let a: String = ctx.get(0)?;
                let b: String = ctx.get(1)?;
                Ok(func(&a, &b) as i64)
            },
        )?;
        tracing::debug!(function = f.name, "registered scalar function");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_usable_from_sql() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn, &standard_functions()).unwrap();

        let d: i64 = conn
            .query_row("SELECT levenshtein('kitten', 'sitting')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(d, 3);

        let d: i64 = conn
            .query_row(
                "SELECT author_name_distance('Robert Kennedy', 'Kennedy Robert')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(d, 0);
    }
}
