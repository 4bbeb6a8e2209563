//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and decoding of bracketed path lists.

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

/// Mnemoscan - instruction-frequency scanner for executable binaries
///
/// Inventories binaries on a filesystem (or from an explicit list),
/// disassembles each with an external objdump-compatible tool, and
/// writes a per-file CSV frequency table of instruction mnemonics.
///
/// Examples:
///   mnemoscan scan-folder -d /usr/bin table.csv
///   mnemoscan scan-folder -d / -r -i "[/proc,/sys]" table.csv
///   mnemoscan scan-files -f "[/bin/ls,/bin/cat]" table.csv
///   mnemoscan init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mnemoscan.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of parallel scan workers (default: one per core)
    #[arg(short, long, global = true, value_name = "NUM", env = "MNEMOSCAN_WORKERS")]
    pub workers: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Scanner subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan the files of a folder (optionally its whole subtree) and
    /// write the instruction-frequency table
    ScanFolder {
        /// Base directory for scanning
        #[arg(short = 'd', long, default_value = "/", value_name = "DIR")]
        base_dir: PathBuf,

        /// Objdump command or path
        #[arg(short, long, default_value = "objdump", value_name = "CMD")]
        objdump_command: String,

        /// Recursively walk the directory tree starting from the base directory
        #[arg(short, long)]
        recursive: bool,

        /// Folders to skip during collection, as a bracketed comma list
        ///
        /// Example: -i "[/proc,/sys]". Matching is a prefix match on the
        /// directory path; a matched folder is pruned with its subtree.
        #[arg(short, long, value_name = "LIST")]
        ignore_folders: Option<String>,

        /// Output CSV path
        #[arg(value_name = "TABLE_PATH")]
        table_path: PathBuf,
    },

    /// Scan an explicit list of files and write the instruction-frequency table
    ScanFiles {
        /// Objdump command or path
        #[arg(short, long, default_value = "objdump", value_name = "CMD")]
        objdump_command: String,

        /// Files to scan, as a bracketed comma list
        ///
        /// Example: -f "[/bin/ls,/bin/cat]". Items must not be separated
        /// by spaces unless the whole list is quoted.
        #[arg(short, long, default_value = "[]", value_name = "LIST")]
        files: String,

        /// Output CSV path
        #[arg(value_name = "TABLE_PATH")]
        table_path: PathBuf,
    },

    /// Generate a default .mnemoscan.toml configuration file
    InitConfig,
}

/// Raised when an explicit path-list argument cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedPathList(pub String);

impl fmt::Display for MalformedPathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed path list: {}", self.0)
    }
}

impl std::error::Error for MalformedPathList {}

/// Decodes a bracketed comma list of paths: `[a,b]` or `a,b`.
///
/// Entries are trimmed of whitespace and surrounding quotes. An empty
/// entry (dangling or doubled comma) is malformed and fatal at
/// argument-parsing time. `[]` and the empty string decode to an empty
/// list.
pub fn parse_path_list(raw: &str) -> Result<Vec<String>, MalformedPathList> {
    let trimmed = raw.trim();
    let inner = match (trimmed.strip_prefix('['), trimmed.strip_suffix(']')) {
        (Some(_), None) | (None, Some(_)) => {
            return Err(MalformedPathList(format!("unbalanced brackets in {:?}", raw)));
        }
        (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
        (None, None) => trimmed,
    };

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for item in inner.split(',') {
        let path = item.trim().trim_matches(['"', '\'']).to_string();
        if path.is_empty() {
            return Err(MalformedPathList(format!("empty entry in {:?}", raw)));
        }
        paths.push(path);
    }
    Ok(paths)
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(0) = self.workers {
            return Err("Workers must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
