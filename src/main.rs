//! Mnemoscan - instruction-frequency scanner for executable binaries.
//!
//! A CLI tool that walks a filesystem (or an explicit file list),
//! disassembles every candidate with an external objdump-compatible
//! tool, and writes a per-file CSV frequency table of instruction
//! mnemonics for downstream statistical analysis.
//!
//! Exit codes:
//!   0 - Success (including scans that found zero files)
//!   1 - Setup error (missing disassembler, malformed arguments, I/O)

mod analysis;
mod cli;
mod config;
mod disasm;
mod models;
mod pipeline;
mod scanner;

use anyhow::{Context, Result};
use cli::{Args, Command};
use config::Config;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Mnemoscan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the scan
    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Scan failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .mnemoscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".mnemoscan.toml");

    if path.exists() {
        eprintln!("⚠️  .mnemoscan.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .mnemoscan.toml")?;

    println!("✅ Created .mnemoscan.toml with default settings.");
    println!("   Edit it to customize workers and the extractor alphabet.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete scan workflow for either subcommand.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let quiet = args.quiet;
    let workers = config.effective_workers();

    let (objdump_command, paths, table_path) = match args.command {
        Command::ScanFolder {
            base_dir,
            objdump_command,
            recursive,
            ignore_folders,
            table_path,
        } => {
            let ignore = match ignore_folders {
                Some(ref raw) => cli::parse_path_list(raw)
                    .context("Failed to decode --ignore-folders")?,
                None => Vec::new(),
            };

            // Pre-flight: a missing disassembler aborts before any
            // enumeration or worker dispatch.
            disasm::validate_tool(&objdump_command).await?;

            if !quiet {
                println!("📂 Scanning folder: {}", base_dir.display());
            }
            let paths = if recursive {
                scanner::enumerate_recursive(&base_dir, &ignore)
            } else {
                scanner::enumerate_flat(&base_dir)
            };
            (objdump_command, paths, table_path)
        }
        Command::ScanFiles {
            objdump_command,
            files,
            table_path,
        } => {
            let files = cli::parse_path_list(&files).context("Failed to decode --files")?;

            disasm::validate_tool(&objdump_command).await?;

            if !quiet {
                println!("📄 Scanning {} listed files", files.len());
            }
            let paths = scanner::enumerate_explicit(&files);
            (objdump_command, paths, table_path)
        }
        Command::InitConfig => unreachable!("handled before logging setup"),
    };

    info!("Enumerated {} candidate files", paths.len());

    let partitions = scanner::partition(paths, workers);
    let context = pipeline::ScanContext {
        objdump_command,
        extractor: config.extractor.clone(),
    };

    let table = pipeline::run_scan(partitions, context, !quiet).await?;

    // Single write, only after aggregation completed fully.
    std::fs::write(&table_path, table.to_csv())
        .with_context(|| format!("Failed to write table to {}", table_path.display()))?;

    let duration = start_time.elapsed().as_secs_f64();
    if !quiet {
        print_summary(&table, &table_path, duration);
    }

    Ok(())
}

/// Print the post-scan summary.
fn print_summary(table: &models::FinalTable, table_path: &PathBuf, duration: f64) {
    println!("\n📊 Scan Summary:");
    if table.is_empty() {
        println!("   No files made it into the table (header-only output).");
    } else {
        println!("   Files in table: {}", table.len());
        println!("   Distinct mnemonics: {}", table.mnemonics.len());
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Scan complete! Table saved to: {}",
        table_path.display()
    );
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .mnemoscan.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load .mnemoscan.toml"),
    }
}
