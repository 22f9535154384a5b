//! Table data module for querycsv
//!
//! This module holds the in-memory shapes that move through the pipeline:
//!
//! - `Value`, the single cell type shared by both renderers
//! - `Dataset`, a header plus data rows waiting to be imported
//! - `ResultSet`, the header plus rows produced by the last statement

use std::fmt;

use rusqlite::types::ValueRef;
use serde::{Serialize, Serializer};

use crate::error::{QueryCsvError, QueryCsvResult};

/// Represents a value in a result cell
///
/// SQLite hands back one of five storage classes. Everything imported from
/// a delimited file starts out as `Text`; the other variants appear once SQL
/// computes new values (e.g. `count(*)` or arithmetic in an UPDATE).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Represents a NULL value
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Real(f64),
    /// UTF-8 string
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
}

impl Value {
    /// Whether this cell looks like a number
    ///
    /// Integers and reals always do. Text does when it parses as a float or a
    /// 128-bit integer, which is the same test the CSV writer's non-numeric
    /// quoting applies to the rendered field.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Integer(_) | Value::Real(_) => true,
            Value::Text(s) => s.parse::<f64>().is_ok() || s.parse::<i128>().is_ok(),
            Value::Null | Value::Blob(_) => false,
        }
    }
}

/// Text rendering shared by the pretty printer and the CSV writer
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            // Whole reals keep one fractional digit so 6.0 doesn't read as an integer
            Value::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{r:.1}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

/// Serializes a cell as its display text, with NULL as an empty field
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// A header row plus data rows, all cells as text
///
/// Construction checks that the dataset is non-empty and that every data row
/// has as many cells as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from rows where the first row is the header
    ///
    /// # Arguments
    /// * `name` - Label used in error messages
    /// * `rows` - Header row followed by the data rows
    ///
    /// # Returns
    /// * `Err(MalformedSource)` if there is no header row
    /// * `Err(RowShape)` if a data row doesn't match the header length
    pub fn from_rows<R, C>(name: &str, rows: R) -> QueryCsvResult<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>());

        let header = rows.next().ok_or_else(|| QueryCsvError::MalformedSource {
            source_name: name.to_string(),
            reason: "no header row".to_string(),
        })?;

        let mut data = Vec::new();
        for (index, row) in rows.enumerate() {
            if row.len() != header.len() {
                return Err(QueryCsvError::RowShape {
                    source_name: name.to_string(),
                    // header is line 1
                    line: index as u64 + 2,
                    expected: header.len(),
                    found: row.len(),
                });
            }
            data.push(row);
        }

        Ok(Dataset { header, rows: data })
    }

    /// Column names in order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The header and rows produced by the final statement of a script
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Create a result set from column names and rows
    pub fn new(header: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { header, rows }
    }

    /// Column names in order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Every row rendered to text, mostly useful for comparisons
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }
}
