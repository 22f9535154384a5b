//! Table import module for querycsv
//!
//! This module materializes datasets as tables in a `Store`. Rows can come
//! from an in-memory `Dataset` or from a delimited file whose dialect is
//! sniffed from its header line. Both paths share one algorithm:
//!
//! 1. If the table exists and overwrite wasn't requested, do nothing
//! 2. Otherwise drop any existing table and create it with one untyped column per header entry
//! 3. Insert every data row with a parameterized statement, cells bound as text
//! 4. Commit once
//!
//! Steps 2-4 run in a single transaction, so a failing row leaves the store
//! as it was before the import started.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::params_from_iter;
use tracing::{debug, info};

use crate::dialect::{self, Dialect, InitialSpaceFilter};
use crate::error::{QueryCsvError, QueryCsvResult};
use crate::store::{quote_identifier, Store};
use crate::table::Dataset;

/// What an import did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The table was (re)created and filled
    Created { table: String, rows: usize },
    /// The table already existed and was left untouched
    Skipped { table: String },
}

impl ImportOutcome {
    /// Name of the table the import targeted
    pub fn table(&self) -> &str {
        match self {
            ImportOutcome::Created { table, .. } | ImportOutcome::Skipped { table } => table,
        }
    }
}

/// Settings for importing delimited files
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Drop and recreate tables that already exist instead of skipping them
    pub overwrite: bool,
    /// Dialect to use instead of sniffing each file
    pub dialect: Option<Dialect>,
}

/// A delimited input file and the table it should become
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvInput {
    /// Explicit table name; derived from the file name when absent
    pub table_name: Option<String>,
    /// Path of the delimited file
    pub path: PathBuf,
}

impl CsvInput {
    /// An input whose table name comes from the file name
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvInput {
            table_name: None,
            path: path.into(),
        }
    }

    /// Import into an explicitly named table
    pub fn with_table_name(mut self, table_name: &str) -> Self {
        self.table_name = Some(table_name.to_string());
        self
    }

    /// The table name to import into
    ///
    /// An explicit name wins; otherwise the file's base name with its
    /// extension stripped is used (`data/orders.csv` becomes `orders`).
    pub fn resolved_table_name(&self) -> QueryCsvResult<String> {
        if let Some(name) = &self.table_name {
            return Ok(name.clone());
        }
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| {
                QueryCsvError::InvalidFileSpec(format!(
                    "Cannot derive a table name from {}",
                    self.path.display()
                ))
            })
    }
}

/// Parse a file specification in the format `[table_name=]file_path`
impl FromStr for CsvInput {
    type Err = QueryCsvError;

    fn from_str(file_spec: &str) -> QueryCsvResult<Self> {
        if let Some((table_name, file_path)) = file_spec.split_once('=') {
            if table_name.is_empty() || file_path.is_empty() {
                return Err(QueryCsvError::InvalidFileSpec(file_spec.to_string()));
            }
            return Ok(CsvInput::new(file_path).with_table_name(table_name));
        }

        let input = CsvInput::new(file_spec);
        if input.path.file_name().is_none() {
            return Err(QueryCsvError::InvalidFileSpec(file_spec.to_string()));
        }
        Ok(input)
    }
}

/// Import an in-memory dataset as a table
///
/// # Arguments
/// * `store` - Store to import into
/// * `dataset` - Header and data rows
/// * `table_name` - Name of the table to create
/// * `overwrite` - Replace the table if it already exists
///
/// # Returns
/// * `Ok(ImportOutcome)` - Whether the table was created or skipped
/// * `Err` if the header is unusable or the store rejects the import
pub fn import_dataset(
    store: &Store,
    dataset: &Dataset,
    table_name: &str,
    overwrite: bool,
) -> QueryCsvResult<ImportOutcome> {
    let rows = dataset.rows().iter().map(|row| Ok(row.clone()));
    load_table(store, table_name, table_name, dataset.header(), rows, overwrite)
}

/// Import a delimited file as a table
///
/// The dialect comes from `options.dialect` when set, otherwise it is
/// sniffed from the file's first line. The first record is the header.
///
/// # Arguments
/// * `store` - Store to import into
/// * `input` - The file and optional explicit table name
/// * `options` - Overwrite policy and dialect override
///
/// # Returns
/// * `Ok(ImportOutcome)` - Whether the table was created or skipped
/// * `Err(MalformedSource)` if the file has no header
/// * `Err(RowShape)` if a data row doesn't match the header length
/// * `Err(DialectInference)` if the dialect can't be sniffed
pub fn import_csv(
    store: &Store,
    input: &CsvInput,
    options: &ImportOptions,
) -> QueryCsvResult<ImportOutcome> {
    let table_name = input.resolved_table_name()?;
    let path = input.path.as_path();
    let source_name = path.display().to_string();

    let dialect = match options.dialect {
        Some(dialect) => dialect,
        None => dialect::sniff_file(path)?,
    };
    debug!("Importing {} into table '{}'", source_name, table_name);

    let mut reader = open_reader(path, &dialect)?;
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|s| s.to_string()).collect(),
        None => {
            return Err(QueryCsvError::MalformedSource {
                source_name,
                reason: "file is empty, no header row".to_string(),
            })
        }
    };

    let expected = header.len();
    let rows = records.map(|record| -> QueryCsvResult<Vec<String>> {
        let record = record?;
        if record.len() != expected {
            return Err(QueryCsvError::RowShape {
                source_name: source_name.clone(),
                line: record.position().map_or(0, |pos| pos.line()),
                expected,
                found: record.len(),
            });
        }
        Ok(record.iter().map(|s| s.to_string()).collect())
    });

    load_table(
        store,
        &source_name,
        &table_name,
        &header,
        rows,
        options.overwrite,
    )
}

type FileReader = csv::Reader<InitialSpaceFilter<BufReader<File>>>;

fn open_reader(path: &Path, dialect: &Dialect) -> QueryCsvResult<FileReader> {
    let file = File::open(path)?;
    Ok(dialect.reader(BufReader::new(file)))
}

/// The algorithm shared by both import paths
fn load_table<I>(
    store: &Store,
    source_name: &str,
    table_name: &str,
    header: &[String],
    rows: I,
    overwrite: bool,
) -> QueryCsvResult<ImportOutcome>
where
    I: Iterator<Item = QueryCsvResult<Vec<String>>>,
{
    let exists = store.has_table(table_name)?;
    if exists && !overwrite {
        info!("Table '{}' already exists, skipping import", table_name);
        return Ok(ImportOutcome::Skipped {
            table: table_name.to_string(),
        });
    }

    check_header(source_name, header)?;

    let table = quote_identifier(table_name);
    let columns = header
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=header.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    // Dropped without commit on any early return, which rolls everything back
    let tx = store.connection().unchecked_transaction()?;
    if exists {
        debug!("Dropping existing table '{}'", table_name);
        tx.execute(&format!("DROP TABLE {table}"), [])?;
    }
    tx.execute(&format!("CREATE TABLE {table} ({columns})"), [])?;

    let mut count = 0;
    {
        let mut insert = tx.prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))?;
        for row in rows {
            let row = row?;
            insert.execute(params_from_iter(row.iter()))?;
            count += 1;
        }
    }
    tx.commit()?;

    info!("Imported {} rows into table '{}'", count, table_name);
    Ok(ImportOutcome::Created {
        table: table_name.to_string(),
        rows: count,
    })
}

fn check_header(source_name: &str, header: &[String]) -> QueryCsvResult<()> {
    let malformed = |reason: String| QueryCsvError::MalformedSource {
        source_name: source_name.to_string(),
        reason,
    };

    if header.is_empty() {
        return Err(malformed("header row has no columns".to_string()));
    }

    // SQLite column names are case-insensitive
    let mut seen = HashSet::new();
    for name in header {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(malformed(format!("duplicate column name '{name}'")));
        }
    }
    Ok(())
}
