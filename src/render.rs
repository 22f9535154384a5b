//! Result rendering for querycsv
//!
//! Two independent renderers over a `ResultSet`:
//!
//! - a fixed-width text table for the console
//! - a CSV serializer that quotes every non-numeric field
//!
//! Both take cell text from `Value`'s `Display` implementation, and the CSV
//! writer's quoting agrees with `Value::is_numeric`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::QuoteStyle;
use tracing::debug;

use crate::error::QueryCsvResult;
use crate::table::ResultSet;

/// Column separator used by the pretty printer
const COLUMN_SEPARATOR: &str = " | ";

/// Line printed in place of data rows when a query returns nothing
const NO_RESULTS: &str = "No results";

/// Render a result set as an aligned text table
///
/// Each column is as wide as its longest cell or header. The header is
/// followed by a line of `=` spanning the table; every line starts with a
/// single space. A result without rows prints `No results` instead of rows.
/// A result without columns renders as nothing.
pub fn format_pretty(result: &ResultSet) -> String {
    if result.column_count() == 0 {
        return String::new();
    }

    let cells = result.text_rows();
    let mut widths: Vec<usize> = result
        .header()
        .iter()
        .map(|name| name.chars().count())
        .collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |row: &[String]| -> String {
        let padded: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!(" {}\n", padded.join(COLUMN_SEPARATOR))
    };

    let rule_len = widths.iter().sum::<usize>() + 3 * widths.len() - 1;

    let mut out = format_line(result.header());
    out.push_str(&"=".repeat(rule_len));
    out.push('\n');

    if cells.is_empty() {
        out.push_str(NO_RESULTS);
        out.push('\n');
    } else {
        for row in &cells {
            out.push_str(&format_line(row));
        }
    }

    out
}

/// Write the aligned text table for a result set
pub fn pretty_print<W: Write>(result: &ResultSet, out: &mut W) -> QueryCsvResult<()> {
    out.write_all(format_pretty(result).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Serialize a result set as CSV
///
/// Writes the header and then one record per row, comma-separated, quoting
/// every field that isn't numeric. NULL cells become an empty quoted field.
pub fn write_csv<W: Write>(result: &ResultSet, out: W) -> QueryCsvResult<()> {
    if result.column_count() == 0 {
        return Ok(());
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(out);

    csv_writer.write_record(result.header())?;
    for row in result.rows() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Serialize a result set as CSV into a file, replacing any existing file
pub fn write_csv_file(result: &ResultSet, path: &Path) -> QueryCsvResult<()> {
    let file = File::create(path)?;
    write_csv(result, BufWriter::new(file))?;
    debug!("Wrote {} rows to {}", result.row_count(), path.display());
    Ok(())
}
