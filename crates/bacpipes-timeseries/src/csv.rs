//! BACpipes CSV Encoding
//!
//! Comma-separated output with a header row. Fields containing a comma,
//! quote or line break are quoted with embedded quotes doubled. Numbers are
//! written in their shortest exact form so parsing them back yields the
//! same `f64`.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use chrono::{DateTime, SecondsFormat, Utc};

/// Escape a field for CSV output.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a value at full precision.
///
/// `Debug` gives the shortest representation that round-trips and keeps a
/// trailing `.0` on integral values.
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// RFC 3339 in UTC with as many fractional digits as the instant carries.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// =============================================================================
// Writer
// =============================================================================

/// Accumulates CSV records into a string.
#[derive(Debug, Default)]
pub struct CsvWriter {
    buf: String,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record; every field is escaped.
    pub fn write_record<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.buf.push(',');
            }
            self.buf.push_str(&escape_field(field.as_ref()));
            first = false;
        }
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Split CSV text into records of unescaped fields.
///
/// Accepts `\n` and `\r\n` record separators and quoted fields spanning
/// lines. A trailing newline does not produce an empty record.
#[cfg(test)]
pub(crate) fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

// =============================================================================
// Tests
// =============================================================================
