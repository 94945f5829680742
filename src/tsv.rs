//! Tab separated tables as found in the `raw/` folder of the dataset.
//!
//! Quoting follows the spreadsheet ("excel") convention: a field may be
//! wrapped in double quotes, a doubled quote inside such a field is a literal
//! quote, and quoted fields may contain tabs and line breaks.

use std::collections::HashMap;

use crate::error::{ExportError, Result};

const DELIMITER: char = '\t';
const QUOTE: char = '"';

/// A table stored column-wise, keyed by header.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    columns: HashMap<String, Vec<String>>,
    rows: usize,
}

impl Table {
    /// Parses `text`, using `name` in error messages.
    ///
    /// Columns with an empty header are skipped. Duplicate headers are fatal
    /// since they would make column lookup ambiguous.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = split_records(name, text)?.into_iter();
        let header_record = match records.next() {
            Some(record) => record,
            None => return Err(ExportError::malformed(name, "table has no header row")),
        };
        let mut headers = Vec::new();
        let mut positions = Vec::new();
        for (position, header) in header_record.iter().enumerate() {
            let header = header.trim();
            if header.is_empty() {
                continue;
            }
            if headers.iter().any(|h| h == header) {
                return Err(ExportError::malformed(
                    name,
                    format!("column headers must be unique, '{header}' appears twice"),
                ));
            }
            headers.push(header.to_string());
            positions.push(position);
        }
        let mut columns: HashMap<String, Vec<String>> =
            headers.iter().map(|h| (h.clone(), Vec::new())).collect();
        let mut rows = 0;
        for record in records {
            for (header, position) in headers.iter().zip(&positions) {
                let value = record.get(*position).cloned().unwrap_or_default();
                if let Some(column) = columns.get_mut(header) {
                    column.push(value);
                }
            }
            rows += 1;
        }
        Ok(Self { name: name.to_string(), headers, columns, rows })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    pub fn has_column(&self, header: &str) -> bool {
        self.columns.contains_key(header)
    }
    pub fn column(&self, header: &str) -> Result<&[String]> {
        self.columns
            .get(header)
            .map(Vec::as_slice)
            .ok_or_else(|| ExportError::malformed(&self.name, format!("missing column '{header}'")))
    }
    /// The first of `candidates` that is a column of this table.
    pub fn first_column_of<'c>(&self, candidates: &[&'c str]) -> Result<&'c str> {
        candidates
            .iter()
            .copied()
            .find(|c| self.has_column(c))
            .ok_or_else(|| {
                ExportError::malformed(
                    &self.name,
                    format!("expected one of the columns {}", candidates.join(", ")),
                )
            })
    }
    pub fn len(&self) -> usize {
        self.rows
    }
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

// Splits the text into records of fields. Blank lines carry no record.
fn split_records(name: &str, text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            QUOTE if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            DELIMITER => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => (),
            '\n' | '\r' => {
                if field_started || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            _ => {
                field.push(c);
                field_started = true;
            }
        }
    }
    if in_quotes {
        return Err(ExportError::malformed(name, "unterminated quoted field"));
    }
    if field_started || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}
