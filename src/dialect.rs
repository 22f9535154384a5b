//! Dialect detection for delimited files
//!
//! A `Dialect` describes how a delimited file separates and quotes fields.
//! Input files don't declare their format, so the sniffer infers it from the
//! header line:
//!
//! - the quote character is whichever of `"` or `'` opens a field first
//! - the delimiter is the most frequent of `,` `\t` `;` `|` `:` outside quotes,
//!   ties going to the earlier candidate
//! - a header with none of them is a single-column file
//!
//! An explicit field separator (like awk's -F option) skips sniffing entirely.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{QueryCsvError, QueryCsvResult};

/// Delimiters the sniffer will consider, in order of preference
const CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Field delimiter and quoting conventions of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Byte separating fields
    pub delimiter: u8,
    /// Byte enclosing quoted fields
    pub quote: u8,
    /// Whether whitespace after a delimiter belongs to the layout rather than the field
    pub skip_initial_space: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            quote: b'"',
            skip_initial_space: false,
        }
    }
}

impl Dialect {
    /// Build a dialect from an explicit field separator
    ///
    /// # Arguments
    /// * `separator` - A single character, or `\t` written out for tab
    ///
    /// # Returns
    /// * `Ok(Dialect)` using the separator and double quotes
    /// * `Err(InvalidSeparator)` for anything longer than one byte
    pub fn from_separator(separator: &str) -> QueryCsvResult<Self> {
        let delimiter = if separator.len() == 1 {
            separator.as_bytes()[0]
        } else if separator == "\\t" {
            b'\t'
        } else {
            return Err(QueryCsvError::InvalidSeparator(separator.to_string()));
        };

        Ok(Dialect {
            delimiter,
            ..Dialect::default()
        })
    }

    /// A CSV reader configuration matching this dialect
    ///
    /// Headers are not consumed by the reader and records may vary in
    /// length, so callers see the header as the first record and can report
    /// shape mismatches themselves. The builder knows nothing about
    /// `skip_initial_space`; use [`Dialect::reader`] to honor it.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote);
        builder
    }

    /// A CSV reader over `rdr` that reads fields in this dialect
    pub fn reader<R: Read>(&self, rdr: R) -> csv::Reader<InitialSpaceFilter<R>> {
        self.reader_builder().from_reader(InitialSpaceFilter::new(rdr, *self))
    }
}

/// Where the filter is within the current record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    /// Nothing of the field has been seen yet
    Start,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either its end or the first half of an escape
    QuoteInQuoted,
}

/// Drops the spaces that open an unquoted field
///
/// csv only recognizes a quoted field when the quote is the field's first
/// byte, so in `a, "b, c"` the spaces have to go before parsing, not after.
/// Spaces inside quotes and at the end of a field are kept. When the dialect
/// doesn't skip initial space, bytes pass through untouched.
#[derive(Debug)]
pub struct InitialSpaceFilter<R> {
    inner: R,
    dialect: Dialect,
    state: FieldState,
}

impl<R: Read> InitialSpaceFilter<R> {
    /// Wrap `inner`, filtering according to `dialect`
    pub fn new(inner: R, dialect: Dialect) -> Self {
        InitialSpaceFilter {
            inner,
            dialect,
            state: FieldState::Start,
        }
    }

    /// Advance the state machine by one byte; false means drop it
    fn keep(&mut self, byte: u8) -> bool {
        let ends_field = byte == self.dialect.delimiter || byte == b'\n' || byte == b'\r';
        self.state = match self.state {
            FieldState::Start if byte == b' ' => return false,
            FieldState::Start if byte == self.dialect.quote => FieldState::Quoted,
            FieldState::Quoted if byte == self.dialect.quote => FieldState::QuoteInQuoted,
            FieldState::Quoted => FieldState::Quoted,
            FieldState::QuoteInQuoted if byte == self.dialect.quote => FieldState::Quoted,
            _ if ends_field => FieldState::Start,
            _ => FieldState::Unquoted,
        };
        true
    }
}

impl<R: Read> Read for InitialSpaceFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.dialect.skip_initial_space {
            return self.inner.read(buf);
        }

        loop {
            let read = self.inner.read(buf)?;
            if read == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for pos in 0..read {
                let byte = buf[pos];
                if self.keep(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            // a chunk of nothing but skipped spaces is not end of input
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}

/// Matches a quote character that opens a field
fn field_quote_regex() -> &'static Regex {
    static QUOTE_RE: OnceLock<Regex> = OnceLock::new();
    QUOTE_RE.get_or_init(|| {
        Regex::new(r#"(?:^|[,\t;|:]) ?(["'])"#).expect("quote pattern is valid")
    })
}

/// Infer the dialect of a delimited file from a sample of its text
///
/// Only the first line of `sample` is inspected.
///
/// # Arguments
/// * `source_name` - Label used in error messages
/// * `sample` - Leading text of the file
///
/// # Returns
/// * `Ok(Dialect)` - The inferred dialect
/// * `Err(DialectInference)` if the sample is empty, binary, or has unbalanced quotes
pub fn sniff(source_name: &str, sample: &str) -> QueryCsvResult<Dialect> {
    let line = sample
        .lines()
        .next()
        .unwrap_or("")
        .trim_start_matches('\u{feff}')
        .trim_end_matches('\r');

    let fail = |reason: &str| QueryCsvError::DialectInference {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    };

    if line.trim().is_empty() {
        return Err(fail("sample is empty"));
    }
    if line.chars().any(|c| c.is_control() && c != '\t') {
        return Err(fail("sample contains control characters"));
    }

    let quote = field_quote_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().as_bytes()[0])
        .unwrap_or(b'"');

    let mut counts = [0usize; CANDIDATES.len()];
    let mut spaced = [0usize; CANDIDATES.len()];
    let mut in_quotes = false;
    let bytes = line.as_bytes();
    for (pos, &byte) in bytes.iter().enumerate() {
        if byte == quote {
            // a doubled quote toggles twice and leaves the state unchanged
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(idx) = CANDIDATES.iter().position(|&c| c == byte) {
                counts[idx] += 1;
                if bytes.get(pos + 1) == Some(&b' ') {
                    spaced[idx] += 1;
                }
            }
        }
    }
    if in_quotes {
        return Err(fail("unbalanced quotes"));
    }

    // max_by_key keeps the last maximum, so walk the candidates in reverse
    let best = (0..CANDIDATES.len())
        .rev()
        .max_by_key(|&idx| counts[idx])
        .filter(|&idx| counts[idx] > 0);

    let dialect = match best {
        Some(idx) => Dialect {
            delimiter: CANDIDATES[idx],
            quote,
            skip_initial_space: spaced[idx] == counts[idx],
        },
        None => Dialect {
            quote,
            ..Dialect::default()
        },
    };

    debug!(
        "Sniffed {}: delimiter {:?}, quote {:?}, skip initial space {}",
        source_name,
        dialect.delimiter as char,
        dialect.quote as char,
        dialect.skip_initial_space
    );

    Ok(dialect)
}

/// Infer the dialect of a delimited file from its first line
///
/// # Arguments
/// * `path` - Path of the delimited file
///
/// # Returns
/// * `Ok(Dialect)` - The inferred dialect
/// * `Err(MalformedSource)` if the file is empty or its first line is blank
/// * `Err(DialectInference)` if the header line can't be interpreted
pub fn sniff_file(path: &Path) -> QueryCsvResult<Dialect> {
    let source_name = path.display().to_string();
    let malformed = |reason: &str| QueryCsvError::MalformedSource {
        source_name: source_name.clone(),
        reason: reason.to_string(),
    };

    let mut reader = BufReader::new(File::open(path)?);
    let mut first_line = String::new();
    if reader.read_line(&mut first_line)? == 0 {
        return Err(malformed("file is empty, no header row"));
    }
    if first_line.trim_start_matches('\u{feff}').trim().is_empty() {
        return Err(malformed("first line is blank, no header row"));
    }

    sniff(&source_name, &first_line)
}
