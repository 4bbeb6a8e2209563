//! Mnemonic extraction from disassembler listings.
//!
//! Each listing line contributes at most one count: the first
//! whitespace token that looks like an instruction mnemonic. The
//! allowed-character alphabet and the prefix exclusion list live in
//! configuration ([`crate::config::ExtractorConfig`]) so they can be
//! adjusted per target instruction set without a rebuild.

use crate::config::ExtractorConfig;
use crate::models::InstructionCounts;

/// Decides whether a token is an instruction mnemonic.
///
/// A token qualifies when every character belongs to the allowed
/// alphabet, it is not an instruction prefix (lock/rep*/segment
/// overrides), and it does not contain `0x` (hex immediates and
/// addresses).
fn is_instruction(token: &str, config: &ExtractorConfig) -> bool {
    if token.is_empty() {
        return false;
    }
    if !token.chars().all(|c| config.allowed_symbols.contains(c)) {
        return false;
    }
    if config.prefixes.iter().any(|prefix| prefix == token) {
        return false;
    }
    if token.contains("0x") {
        return false;
    }
    true
}

/// Returns the first qualifying token of a listing line, if any.
fn extract_line<'a>(line: &'a str, config: &ExtractorConfig) -> Option<&'a str> {
    line.split_whitespace()
        .find(|token| is_instruction(token, config))
}

/// Builds the per-file mnemonic frequency map from a raw listing.
///
/// Lines with no qualifying token (labels, section headers, blank
/// lines) are ignored.
pub fn extract(listing: &str, config: &ExtractorConfig) -> InstructionCounts {
    let mut counts = InstructionCounts::new();
    for line in listing.lines() {
        if let Some(mnemonic) = extract_line(line, config) {
            *counts.entry(mnemonic.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
