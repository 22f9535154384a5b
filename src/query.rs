//! Query entry points for querycsv
//!
//! These functions tie the pipeline together: import every input file into
//! the store, run the statements, and hand back the final result set. Each
//! takes a `StoreHandle`; an owned store is closed before the function
//! returns, whether or not the query succeeded.

use std::path::Path;

use tracing::debug;

use crate::error::QueryCsvResult;
use crate::executor;
use crate::importer::{self, CsvInput, ImportOptions};
use crate::script;
use crate::store::{Store, StoreHandle};
use crate::table::ResultSet;

/// Import delimited files and run statements against them
///
/// All inputs are imported, in order, before any statement runs.
///
/// # Arguments
/// * `statements` - SQL statements; only the last one's result is returned
/// * `inputs` - Delimited files, one table each
/// * `store` - Store to import into and query
/// * `options` - Overwrite policy and dialect override for the imports
pub fn query_csv<S: AsRef<str>>(
    statements: &[S],
    inputs: &[CsvInput],
    store: StoreHandle<'_>,
    options: &ImportOptions,
) -> QueryCsvResult<ResultSet> {
    let result = import_and_execute(statements, inputs, &store, options);
    finish(store, result)
}

/// Import delimited files and run a SQL script file against them
///
/// # Arguments
/// * `script_path` - Script split into statements by `script::read_script`
/// * `inputs` - Delimited files, one table each
/// * `store` - Store to import into and query
/// * `options` - Overwrite policy and dialect override for the imports
pub fn query_csv_file(
    script_path: &Path,
    inputs: &[CsvInput],
    store: StoreHandle<'_>,
    options: &ImportOptions,
) -> QueryCsvResult<ResultSet> {
    let statements = match script::read_script(script_path) {
        Ok(statements) => statements,
        Err(err) => return finish(store, Err(err)),
    };
    query_csv(&statements, inputs, store, options)
}

/// Run statements against an existing store
pub fn query_sqlite<S: AsRef<str>>(
    statements: &[S],
    store: StoreHandle<'_>,
) -> QueryCsvResult<ResultSet> {
    let result = executor::execute(&store, statements);
    finish(store, result)
}

/// Run a SQL script file against an existing store
pub fn query_sqlite_file(script_path: &Path, store: StoreHandle<'_>) -> QueryCsvResult<ResultSet> {
    let statements = match script::read_script(script_path) {
        Ok(statements) => statements,
        Err(err) => return finish(store, Err(err)),
    };
    query_sqlite(&statements, store)
}

fn import_and_execute<S: AsRef<str>>(
    statements: &[S],
    inputs: &[CsvInput],
    store: &Store,
    options: &ImportOptions,
) -> QueryCsvResult<ResultSet> {
    for input in inputs {
        let outcome = importer::import_csv(store, input, options)?;
        debug!("Import of {}: {:?}", input.path.display(), outcome);
    }
    executor::execute(store, statements)
}

/// Release the store, keeping the query's own error ahead of a close error
fn finish(store: StoreHandle<'_>, result: QueryCsvResult<ResultSet>) -> QueryCsvResult<ResultSet> {
    let closed = store.finish();
    let result = result?;
    closed?;
    Ok(result)
}
