//! querycsv - run SQL against delimited text files
//!
//! This tool loads CSV and other delimited files into SQLite tables, executes
//! SQL against them, and prints the final result as an aligned table or
//! writes it to a CSV file.
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments
//! 2. Open the store: in memory, an intermediate SQLite file, or an existing database
//! 3. Import every input file as a table (one table per file)
//! 4. Execute the SQL command or script; keep the last statement's result
//! 5. Print the result to stdout, or write it as CSV when an output file is given
//! 6. Remove the intermediate SQLite file unless asked to keep it

mod cli;
mod config;

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::QueryCsvArgs;
use config::AppConfig;
use querycsv::{
    query_csv, query_csv_file, query_sqlite, query_sqlite_file, render, CsvInput, ResultSet,
    StoreHandle, StoreLocation,
};

/// Main entry point for the querycsv utility
///
/// Errors bubble up with context; returning them from `main` prints the
/// message on stderr and exits with a non-zero status.
fn main() -> Result<()> {
    let args = cli::parse_args()?;
    let config = AppConfig::from_args(&args);
    init_tracing(config.verbose());
    debug!("Arguments: {args:?}");

    let result = match &args.use_db {
        Some(db_path) => run_on_database(&args, db_path)?,
        None => run_on_inputs(&args, &config)?,
    };

    match config.output() {
        Some(path) => render::write_csv_file(&result, path)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            render::pretty_print(&result, &mut stdout.lock())
                .context("Failed to print results")?;
        }
    }

    Ok(())
}

/// Install the log subscriber; logs go to stderr so stdout carries only results
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the SQL against an existing SQLite database
fn run_on_database(args: &QueryCsvArgs, db_path: &Path) -> Result<ResultSet> {
    if !db_path.is_file() {
        bail!("SQLite file not found: {}", db_path.display());
    }

    let store = StoreHandle::open(StoreLocation::File(db_path.to_path_buf()))
        .with_context(|| format!("Failed to open SQLite file: {}", db_path.display()))?;

    let sql = args.sql_text();
    let result = if args.script {
        query_sqlite_file(Path::new(&sql), store)
            .with_context(|| format!("Failed to execute script: {sql}"))?
    } else {
        query_sqlite(&[sql.as_str()], store)
            .with_context(|| format!("Failed to execute SQL: {sql}"))?
    };
    Ok(result)
}

/// Import the input files and run the SQL against them
///
/// An intermediate SQLite file replaces any existing file at its path and
/// is removed afterwards, on failure too, unless it should be kept.
fn run_on_inputs(args: &QueryCsvArgs, config: &AppConfig) -> Result<ResultSet> {
    let inputs = args
        .input
        .iter()
        .map(|spec| {
            spec.parse::<CsvInput>()
                .with_context(|| format!("Failed to load file: {spec}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let options = config.import_options()?;

    let location = match config.db_file() {
        Some(path) => {
            remove_if_exists(path)?;
            StoreLocation::File(path.to_path_buf())
        }
        None => StoreLocation::Memory,
    };

    let result = StoreHandle::open(location)
        .context("Failed to open intermediate store")
        .and_then(|store| {
            let sql = args.sql_text();
            if args.script {
                query_csv_file(Path::new(&sql), &inputs, store, &options)
                    .with_context(|| format!("Failed to execute script: {sql}"))
            } else {
                query_csv(&[sql.as_str()], &inputs, store, &options)
                    .with_context(|| format!("Failed to execute SQL: {sql}"))
            }
        });

    if let Some(path) = config.db_file() {
        if config.keep_db() {
            debug!("Keeping SQLite file {}", path.display());
        } else {
            remove_if_exists(path)?;
        }
    }

    result
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to remove SQLite file: {}", path.display()))
        }
    }
}
