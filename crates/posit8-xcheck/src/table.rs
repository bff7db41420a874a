//! Input value tables.
//!
//! A table is a headerless CSV whose first column holds the operand values
//! fed to both the device and the reference. Any further columns are
//! ignored.

use std::path::Path;

use posit8_core::Posit8;
use serde::Serialize;

use crate::error::{Error, Result};

/// One operand from a value table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableEntry {
    /// One-based line in the source file.
    pub line: usize,
    /// The operand exactly as written, passed to the device unchanged.
    pub text: String,
    /// The parsed value, used by the reference.
    pub value: f64,
}

/// Loads the first column of a headerless CSV.
pub fn load_values(path: impl AsRef<Path>) -> Result<Vec<TableEntry>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::io_with_path(e, path))?;
    let entries = read_values(file)?;
    tracing::debug!(path = %path.display(), count = entries.len(), "Loaded value table");
    Ok(entries)
}

/// Reads table entries from any reader.
pub fn read_values<R: std::io::Read>(reader: R) -> Result<Vec<TableEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(entries.len() + 1);
        let Some(text) = record.get(0).filter(|t| !t.is_empty()) else {
            continue;
        };
        let value = text
            .parse::<f64>()
            .map_err(|_| Error::table(line, format!("'{text}' is not a number")))?;
        entries.push(TableEntry {
            line,
            text: text.to_string(),
            value,
        });
    }
    Ok(entries)
}

/// Writes every real posit8 value as `value,bits`, in bit-pattern order.
pub fn write_posit8_table(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut count = 0;
    for posit in Posit8::all().filter(|p| !p.is_nar()) {
        writer.write_record([format!("{:.6}", posit.to_f64()), posit.to_bit_string()])?;
        count += 1;
    }
    writer.flush().map_err(|e| Error::io_with_path(e, path))?;

    tracing::info!(path = %path.display(), count, "Wrote posit8 table");
    Ok(count)
}
