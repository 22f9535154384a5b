//! querycsv library crate
//!
//! This is the library component of querycsv, a small utility that runs SQL
//! against delimited text files. SQLite does the relational work; this crate
//! provides:
//!
//! - Dialect sniffing for delimited files (delimiter and quote character)
//! - Importing files or in-memory datasets as text tables, with skip-if-exists
//!   or overwrite semantics
//! - Splitting SQL scripts into statements and executing them in order
//! - Rendering the final result as an aligned text table or as CSV
//!
//! The `query_*` functions run the whole pipeline; the modules below expose
//! each stage on its own.

pub mod dialect;
pub mod error;
pub mod executor;
pub mod importer;
pub mod query;
pub mod render;
pub mod script;
pub mod store;
pub mod table;

pub use error::{QueryCsvError, QueryCsvResult};
pub use importer::{import_csv, import_dataset, CsvInput, ImportOptions, ImportOutcome};
pub use query::{query_csv, query_csv_file, query_sqlite, query_sqlite_file};
pub use store::{Store, StoreHandle, StoreLocation};
pub use table::{Dataset, ResultSet, Value};
