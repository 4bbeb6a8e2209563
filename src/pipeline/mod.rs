//! Parallel scan pipeline: workers and the dispatch/join barrier.
//!
//! Each worker owns one partition of the enumerated paths and drives
//! the disassembler and extractor over it, producing a partial table
//! as a value. The dispatcher spawns one task per worker, waits for
//! all of them at a single join barrier, and hands the partial tables
//! to the aggregator. Workers share nothing mutable; the progress bar
//! is internally synchronized.

use crate::analysis::aggregate;
use crate::config::ExtractorConfig;
use crate::disasm;
use crate::models::{FileRow, FinalTable, PartialTable};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Everything a worker needs besides its partition. Read-only.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Disassembler command or path, validated before dispatch.
    pub objdump_command: String,
    /// Extractor alphabet and prefix exclusions.
    pub extractor: ExtractorConfig,
}

/// Scans one partition sequentially and returns its partial table.
///
/// Per-file failures (unresolvable path, disassembler rejection) are
/// logged and skipped; they never escape the worker. Each file blocks
/// the worker until its subprocess exits.
pub async fn scan_partition(
    partition: Vec<PathBuf>,
    context: ScanContext,
    progress: ProgressBar,
) -> PartialTable {
    let mut table = PartialTable::new();

    for path in partition {
        match scan_one(&path, &context).await {
            Ok(row) => table.push(row),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
        progress.inc(1);
    }

    table
}

/// Resolves, disassembles, and extracts one file.
async fn scan_one(path: &Path, context: &ScanContext) -> Result<FileRow> {
    // Canonical identity first: rows for a symlink and its target must
    // collapse to one during aggregation.
    let canonical = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("cannot resolve {}", path.display()))?;

    let listing = disasm::disassemble(&context.objdump_command, &canonical).await?;
    let counts = disasm::extract::extract(&listing, &context.extractor);

    debug!(
        "Scanned {}: {} distinct mnemonics",
        canonical.display(),
        counts.len()
    );

    Ok(FileRow::new(canonical.to_string_lossy(), counts))
}

/// Runs the full scan: partition, dispatch, join, aggregate.
///
/// The disassembler must already have passed its pre-flight check.
/// Returns the final deduplicated table; nothing is written to disk
/// here.
pub async fn run_scan(
    partitions: Vec<Vec<PathBuf>>,
    context: ScanContext,
    show_progress: bool,
) -> Result<FinalTable> {
    let total_files: usize = partitions.iter().map(|p| p.len()).sum();
    info!(
        "Dispatching {} files across {} workers",
        total_files,
        partitions.len()
    );

    let progress = if show_progress {
        let bar = ProgressBar::new(total_files as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let worker_count = partitions.len();
    let mut workers = JoinSet::new();
    for (index, partition) in partitions.into_iter().enumerate() {
        let context = context.clone();
        let progress = progress.clone();
        workers.spawn(async move { (index, scan_partition(partition, context, progress).await) });
    }

    // Join barrier: no partial result is consumed until every worker
    // has finished. Partials are slotted by partition index so the
    // output row order does not depend on worker timing.
    let mut partials: Vec<PartialTable> = vec![PartialTable::new(); worker_count];
    while let Some(joined) = workers.join_next().await {
        let (index, partial) = joined.context("scan worker panicked")?;
        partials[index] = partial;
    }

    progress.finish_and_clear();

    Ok(aggregate(partials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    /// Writes a fake objdump that prints a fixed listing and accepts -v.
    fn fake_objdump(dir: &std::path::Path) -> String {
        let script = dir.join("fake-objdump");
        fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = \"-v\" ]; then exit 0; fi\nprintf '  mov %%eax,%%ebx\\n  mov %%ebx,%%ecx\\n  ret\\n'\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().to_string()
    }

    fn context(objdump: String) -> ScanContext {
        ScanContext {
            objdump_command: objdump,
            extractor: ExtractorConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_worker_scans_its_partition() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.bin");
        fs::write(&file, b"\x90").unwrap();
        let tool = fake_objdump(dir.path());

        let table =
            scan_partition(vec![file], context(tool), ProgressBar::hidden()).await;

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].counts.get("mov"), Some(&2));
        assert_eq!(table.rows[0].counts.get("ret"), Some(&1));
    }

    #[tokio::test]
    async fn test_worker_skips_unresolvable_files() {
        let dir = tempdir().unwrap();
        let tool = fake_objdump(dir.path());
        let missing = dir.path().join("no-such-file");

        let table =
            scan_partition(vec![missing], context(tool), ProgressBar::hidden()).await;

        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_worker_skips_rejected_files_and_continues() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.bin");
        let bad = dir.path().join("bad.bin");
        fs::write(&good, b"\x90").unwrap();
        fs::write(&bad, b"not-an-object").unwrap();

        // Rejects anything named bad.bin with a non-zero exit.
        let script = dir.path().join("picky-objdump");
        fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = \"-v\" ]; then exit 0; fi\ncase \"$4\" in *bad.bin) exit 1;; esac\nprintf '  nop\\n'\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let table = scan_partition(
            vec![bad, good],
            context(script.to_string_lossy().to_string()),
            ProgressBar::hidden(),
        )
        .await;

        assert_eq!(table.len(), 1);
        assert!(table.rows[0].filename.ends_with("good.bin"));
    }

    #[tokio::test]
    async fn test_run_scan_joins_all_workers() {
        let dir = tempdir().unwrap();
        let tool = fake_objdump(dir.path());

        let mut paths = Vec::new();
        for i in 0..4 {
            let path = dir.path().join(format!("f{}.bin", i));
            fs::write(&path, b"\x90").unwrap();
            paths.push(path);
        }

        let partitions = crate::scanner::partition(paths, 2);
        let table = run_scan(partitions, context(tool), false).await.unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.mnemonics, vec!["mov".to_string(), "ret".to_string()]);
    }

    #[tokio::test]
    async fn test_rows_follow_partition_order_not_completion_order() {
        let dir = tempdir().unwrap();
        let slow = dir.path().join("slow.bin");
        let fast = dir.path().join("fast.bin");
        fs::write(&slow, b"\x90").unwrap();
        fs::write(&fast, b"\x90").unwrap();

        // Stalls on slow.bin so its worker finishes last.
        let script = dir.path().join("stalling-objdump");
        fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = \"-v\" ]; then exit 0; fi\ncase \"$4\" in *slow.bin) sleep 1;; esac\nprintf '  nop\\n'\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let partitions = vec![vec![slow], vec![fast]];
        let table = run_scan(
            partitions,
            context(script.to_string_lossy().to_string()),
            false,
        )
        .await
        .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.rows[0].0.ends_with("slow.bin"));
        assert!(table.rows[1].0.ends_with("fast.bin"));
    }

    #[tokio::test]
    async fn test_run_scan_over_nothing_is_well_formed() {
        let dir = tempdir().unwrap();
        let tool = fake_objdump(dir.path());

        let table = run_scan(vec![Vec::new(), Vec::new()], context(tool), false)
            .await
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(table.to_csv(), "filename\n");
    }
}
