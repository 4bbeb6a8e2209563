//! Partial-table merging.
//!
//! Aggregation outer-joins the mnemonic columns of all partial tables,
//! zero-fills cells a row's originating table never saw, deduplicates
//! rows by canonical path, and fixes a deterministic column order. It
//! is pure: given the same partial tables it always produces the same
//! final table.

use crate::models::{FinalTable, PartialTable};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Merges all partial tables into the final table.
///
/// Column order is the sorted union of all mnemonics, with the
/// identity column first in serialization. When two rows share a
/// canonical path (the same file reached through two enumerated paths,
/// e.g. a symlink and its target) the first row wins; counts for the
/// same real file are identical by construction, so nothing is lost.
pub fn aggregate(partials: Vec<PartialTable>) -> FinalTable {
    let mnemonics: Vec<String> = partials
        .iter()
        .flat_map(|table| table.columns())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();

    for table in partials {
        for row in table.rows {
            if !seen.insert(row.filename.clone()) {
                debug!("Dropping duplicate row for {}", row.filename);
                continue;
            }

            // Outer join: absent mnemonics become explicit zeros.
            let counts: Vec<u64> = mnemonics
                .iter()
                .map(|mnemonic| row.counts.get(mnemonic).copied().unwrap_or(0))
                .collect();
            rows.push((row.filename, counts));
        }
    }

    FinalTable { mnemonics, rows }
}
