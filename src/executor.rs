//! SQL execution for querycsv
//!
//! Statements run in order against one store. Every statement but the last
//! is stepped to completion and its rows (if any) discarded; the last one's
//! column names and rows become the `ResultSet`. Execution stops at the first
//! failing statement. Statements with no SQL in them, such as a lone `;`, are
//! no-ops.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{QueryCsvError, QueryCsvResult};
use crate::store::Store;
use crate::table::{ResultSet, Value};

/// Execute statements in order and return the last statement's result
///
/// # Arguments
/// * `store` - Store to execute against
/// * `statements` - Non-empty sequence of SQL statements
///
/// # Returns
/// * `Ok(ResultSet)` - Header and rows of the final statement; both empty when it
///   produces no columns (e.g. an UPDATE) or is itself empty
/// * `Err(EmptyScript)` if there are no statements
/// * `Err(StatementExecution)` carrying the first statement the store rejects
pub fn execute<S: AsRef<str>>(store: &Store, statements: &[S]) -> QueryCsvResult<ResultSet> {
    let (last, leading) = statements.split_last().ok_or(QueryCsvError::EmptyScript)?;
    let conn = store.connection();

    for sql in leading {
        let sql = sql.as_ref();
        if is_blank(sql) {
            debug!("Skipping empty statement");
            continue;
        }
        debug!("Executing SQL: {}", sql);
        run_statement(conn, sql).map_err(|source| QueryCsvError::StatementExecution {
            statement: sql.to_string(),
            source,
        })?;
    }

    let sql = last.as_ref();
    if is_blank(sql) {
        debug!("Final statement is empty, no result");
        return Ok(ResultSet::default());
    }
    debug!("Executing final SQL: {}", sql);
    let result = fetch_result(conn, sql).map_err(|source| QueryCsvError::StatementExecution {
        statement: sql.to_string(),
        source,
    })?;
    debug!("Query returned {} rows", result.row_count());

    Ok(result)
}

/// Whether a statement holds nothing but whitespace and semicolons
///
/// SQLite prepares such text as a null statement that can't be stepped.
fn is_blank(sql: &str) -> bool {
    sql.chars().all(|c| c == ';' || c.is_whitespace())
}

/// Step a statement to completion, ignoring any rows it produces
fn run_statement(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}

/// Run a statement and collect its column names and rows
fn fetch_result(conn: &Connection, sql: &str) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    let header: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let column_count = header.len();

    let mut rows = Vec::new();
    let mut db_rows = stmt.query([])?;
    while let Some(row) = db_rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(Value::from(row.get_ref(i)?));
        }
        rows.push(values);
    }

    Ok(ResultSet::new(header, rows))
}
