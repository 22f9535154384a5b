//! SQL script splitting for querycsv
//!
//! Scripts are split with a line-based heuristic rather than a SQL parser:
//!
//! - a line whose first non-space characters are `--` is a comment and is dropped
//! - a line ending in `;` terminates the current statement
//! - lines in between are joined with a single space
//!
//! A trailing statement with no terminating `;` is dropped. Semicolons inside
//! string literals, or comments that share a line with code, will mis-split.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::QueryCsvResult;

/// Split the text of a SQL script into individual statements
///
/// # Arguments
/// * `script` - Raw script text
///
/// # Returns
/// The complete statements in order, each trimmed and still carrying its `;`
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);

        if line.ends_with(';') {
            statements.push(current.trim().to_string());
            current.clear();
        }
    }

    if !current.is_empty() {
        debug!("Dropping unterminated statement: {}", current);
    }

    statements
}

/// Read a script file and split it into statements
///
/// # Arguments
/// * `path` - Path of the script file
///
/// # Returns
/// * `Ok(Vec<String>)` - The statements in file order
/// * `Err` if the file can't be read
pub fn read_script(path: &Path) -> QueryCsvResult<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let statements = split_statements(&text);
    debug!(
        "Read {} statements from {}",
        statements.len(),
        path.display()
    );
    Ok(statements)
}
