//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mnemoscan.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Mnemonic extractor settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Number of parallel workers. 0 means one per available core.
    #[serde(default)]
    pub workers: usize,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            verbose: false,
        }
    }
}

/// Mnemonic extractor settings.
///
/// The allowed alphabet deliberately covers only the characters that
/// occur in real listing mnemonics for the target instruction set;
/// tokens with any other character are operands, labels, or noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Characters a mnemonic token may consist of.
    #[serde(default = "default_allowed_symbols")]
    pub allowed_symbols: String,

    /// Instruction prefixes that are never counted as mnemonics.
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            allowed_symbols: default_allowed_symbols(),
            prefixes: default_prefixes(),
        }
    }
}

fn default_allowed_symbols() -> String {
    "0123456789qazwsxedcrfvtgbyhnujmikolp".to_string()
}

fn default_prefixes() -> Vec<String> {
    vec![
        "lock", "repne", "repnz", "rep", "repe", "repz", "cs", "ss", "ds", "es", "fs", "gs",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".mnemoscan.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(workers) = args.workers {
            self.general.workers = workers;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Number of workers to dispatch, resolving 0 to the core count.
    pub fn effective_workers(&self) -> usize {
        if self.general.workers > 0 {
            self.general.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.workers, 0);
        assert!(config.extractor.allowed_symbols.contains('q'));
        assert!(config.extractor.prefixes.contains(&"lock".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
workers = 2
verbose = true

[extractor]
allowed_symbols = "abc123"
prefixes = ["lock"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.workers, 2);
        assert!(config.general.verbose);
        assert_eq!(config.extractor.allowed_symbols, "abc123");
        assert_eq!(config.extractor.prefixes, vec!["lock"]);
    }

    #[test]
    fn test_effective_workers_resolves_auto() {
        let config = Config::default();
        assert!(config.effective_workers() >= 1);

        let mut fixed = Config::default();
        fixed.general.workers = 3;
        assert_eq!(fixed.effective_workers(), 3);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[extractor]"));
    }
}
