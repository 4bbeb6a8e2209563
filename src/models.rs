//! Data models for the instruction scanner.
//!
//! This module contains the core data structures used throughout the
//! pipeline for representing per-file instruction counts, per-worker
//! partial tables, and the final aggregated table.

use std::collections::{BTreeSet, HashMap};

/// Name of the file-identity column. Always serialized first.
pub const FILENAME_COLUMN: &str = "filename";

/// Per-file mapping from instruction mnemonic to occurrence count.
pub type InstructionCounts = HashMap<String, u64>;

/// One scanned file: its canonical path and its instruction counts.
#[derive(Debug, Clone)]
pub struct FileRow {
    /// Symlink-resolved path of the scanned file. Deduplication key.
    pub filename: String,
    /// Mnemonic occurrence counts. Absent mnemonics are implicitly zero.
    pub counts: InstructionCounts,
}

impl FileRow {
    /// Creates a row for a scanned file.
    pub fn new(filename: impl Into<String>, counts: InstructionCounts) -> Self {
        Self {
            filename: filename.into(),
            counts,
        }
    }
}

/// Intermediate result produced by one worker before aggregation.
///
/// Rows keep enumeration order within the worker's partition; columns
/// are the union of mnemonics seen in that partition.
#[derive(Debug, Clone, Default)]
pub struct PartialTable {
    /// One row per successfully scanned file.
    pub rows: Vec<FileRow>,
}

impl PartialTable {
    /// Creates an empty partial table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row for a scanned file.
    pub fn push(&mut self, row: FileRow) {
        self.rows.push(row);
    }

    /// Returns the number of rows in this table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the sorted union of mnemonics seen in this table.
    pub fn columns(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|row| row.counts.keys().cloned())
            .collect()
    }
}

/// The aggregated, rectangular result of a full scan.
///
/// Every row has a defined count for every mnemonic column (zero-filled
/// during aggregation), and there is exactly one row per canonical path.
#[derive(Debug, Clone, Default)]
pub struct FinalTable {
    /// Mnemonic columns in serialization order (sorted, stable).
    pub mnemonics: Vec<String>,
    /// One (canonical path, counts-per-column) entry per distinct file.
    pub rows: Vec<(String, Vec<u64>)>,
}

impl FinalTable {
    /// Returns the number of file rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no files made it into the table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serializes the table as CSV with a header row.
    ///
    /// The identity column comes first; a scan over zero files still
    /// produces a well-formed header-only document.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(FILENAME_COLUMN);
        for mnemonic in &self.mnemonics {
            output.push(',');
            output.push_str(&csv_field(mnemonic));
        }
        output.push('\n');

        for (filename, counts) in &self.rows {
            output.push_str(&csv_field(filename));
            for count in counts {
                output.push(',');
                output.push_str(&count.to_string());
            }
            output.push('\n');
        }

        output
    }
}

/// Quotes a CSV field when it contains the delimiter, a quote, or a newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
