//! Configuration module for querycsv
//!
//! This module provides a centralized configuration structure for the binary.
//! Settings are gathered once from the command line and passed down
//! explicitly instead of living in global state.

use std::path::{Path, PathBuf};

use crate::cli::QueryCsvArgs;
use querycsv::dialect::Dialect;
use querycsv::importer::ImportOptions;
use querycsv::QueryCsvResult;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show verbose output
    verbose: bool,

    /// Custom field separator for all input files
    field_separator: Option<String>,

    /// CSV file to write the result to, instead of printing it
    output: Option<PathBuf>,

    /// SQLite file used as intermediate storage instead of memory
    db_file: Option<PathBuf>,

    /// Whether to keep the intermediate SQLite file
    keep_db: bool,

    /// Whether imports replace tables that already exist
    overwrite: bool,
}

impl AppConfig {
    /// Create a new application configuration
    ///
    /// # Arguments
    /// * `verbose` - Whether to show verbose output
    /// * `field_separator` - Optional field separator from the command line
    /// * `output` - Optional CSV output path
    /// * `db_file` - Optional intermediate SQLite file
    /// * `keep_db` - Whether to keep the intermediate SQLite file
    pub fn new(
        verbose: bool,
        field_separator: Option<String>,
        output: Option<PathBuf>,
        db_file: Option<PathBuf>,
        keep_db: bool,
    ) -> Self {
        Self {
            verbose,
            field_separator,
            output,
            db_file,
            keep_db,
            // every invocation reloads its inputs from scratch
            overwrite: true,
        }
    }

    /// Build the configuration from parsed command-line arguments
    pub fn from_args(args: &QueryCsvArgs) -> Self {
        Self::new(
            args.verbose,
            args.field_separator.clone(),
            args.output.clone(),
            args.db_file.clone(),
            args.keep,
        )
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the CSV output path
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Get the intermediate SQLite file
    pub fn db_file(&self) -> Option<&Path> {
        self.db_file.as_deref()
    }

    /// Get whether to keep the intermediate SQLite file
    pub fn keep_db(&self) -> bool {
        self.keep_db
    }

    /// Import settings for the library
    ///
    /// # Returns
    /// * `Err` if the field separator isn't a single character
    pub fn import_options(&self) -> QueryCsvResult<ImportOptions> {
        let dialect = self
            .field_separator
            .as_deref()
            .map(Dialect::from_separator)
            .transpose()?;
        Ok(ImportOptions {
            overwrite: self.overwrite,
            dialect,
        })
    }
}
