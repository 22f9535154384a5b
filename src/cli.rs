//! CLI argument parsing module for querycsv
//!
//! This module handles parsing command-line arguments using the clap crate.
//! Two invocation shapes are supported:
//!
//! - `querycsv -i <csv file>... [-o <file>] [-f <sqlite file> [-k]] (-s <script> | <SQL>)`
//! - `querycsv -u <sqlite file> [-o <file>] (-s <script> | <SQL>)`

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};

/// Command-line arguments for querycsv
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Executes SQL on delimited text files",
    after_help = "Table names used in the SQL match the input file names without their \
                  extension, unless given as table_name=file_path. When a script is used, \
                  only the output of its last statement is shown."
)]
#[clap(group(ArgGroup::new("source").required(true).args(["input", "use_db"])))]
pub struct QueryCsvArgs {
    /// Delimited input files - format: [table_name=]file_path
    ///
    /// Can be repeated to load several files. Each becomes one table,
    /// named after the file unless a table name is given.
    #[clap(short, long, value_name = "FILE", help = "Input CSV file as [table_name=]file_path")]
    pub input: Vec<String>,

    /// Query an existing SQLite database instead of CSV files
    #[clap(
        short,
        long,
        value_name = "SQLITE_FILE",
        conflicts_with_all = ["input", "db_file", "keep"],
        help = "Use the specified SQLite file for input"
    )]
    pub use_db: Option<PathBuf>,

    /// Write the result as CSV to this file instead of printing a table
    #[clap(short, long, value_name = "FILE", help = "Send output to the named CSV file")]
    pub output: Option<PathBuf>,

    /// Treat the positional argument as the path of a SQL script
    #[clap(short, long, help = "Execute a SQL script from the file given as the argument")]
    pub script: bool,

    /// Use a SQLite file instead of memory as intermediate storage
    ///
    /// Any existing file at this path is replaced.
    #[clap(
        short = 'f',
        long,
        value_name = "SQLITE_FILE",
        help = "Use a SQLite file instead of memory for intermediate storage"
    )]
    pub db_file: Option<PathBuf>,

    /// Keep the intermediate SQLite file when done
    #[clap(short, long, requires = "db_file", help = "Keep the SQLite file when done")]
    pub keep: bool,

    /// Specify field separator character
    ///
    /// Disables dialect sniffing for all input files.
    /// Examples: -F: for colon-separated files, -F\\t for tab-separated files.
    #[clap(short = 'F', value_name = "SEP", help = "Field separator character")]
    pub field_separator: Option<String>,

    /// Enable verbose diagnostic output
    #[clap(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// SQL command, or script path with -s
    ///
    /// Multiple words are joined with single spaces, so the statement
    /// doesn't have to be quoted as one argument.
    #[clap(required = true, value_name = "SQL")]
    pub sql: Vec<String>,
}

impl QueryCsvArgs {
    /// The positional arguments joined into one command (or script path)
    pub fn sql_text(&self) -> String {
        self.sql.join(" ")
    }
}

/// Parse command-line arguments into the QueryCsvArgs structure
pub fn parse_args() -> Result<QueryCsvArgs> {
    Ok(QueryCsvArgs::parse())
}
