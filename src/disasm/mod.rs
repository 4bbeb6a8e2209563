//! External disassembler invocation.
//!
//! This module shells out to an objdump-compatible disassembler and
//! captures its textual instruction listing. Locating the tool is
//! checked once before any scanning starts; per-file failures are
//! recoverable and absorbed by the worker.

pub mod extract;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Flags passed to every disassembly invocation: disassembly mode, no
/// raw-byte dump, no address prefixes. Not configurable.
const DISASM_ARGS: [&str; 3] = ["-d", "--no-show-raw-insn", "--no-addresses"];

/// Errors from the disassembler subprocess.
#[derive(Debug, Error)]
pub enum DisasmError {
    /// The disassembler executable could not be located. Fatal; raised
    /// by the pre-flight check before any worker is dispatched.
    #[error("no such disassembler: {command}")]
    ToolNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The disassembler rejected one file (not an object file,
    /// unreadable, corrupt). Recoverable; the file is skipped.
    #[error("disassembler exited with {status} for {path}")]
    Failure { path: PathBuf, status: ExitStatus },

    /// The subprocess could not be spawned for one file. Recoverable,
    /// treated like a per-file failure.
    #[error("failed to run disassembler on {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Verifies once, before partitioning, that the disassembler can be
/// spawned at all.
///
/// Runs `<tool> -v` and only cares whether the process starts; a
/// missing executable is fatal for the whole run.
pub async fn validate_tool(command: &str) -> Result<(), DisasmError> {
    let output = Command::new(command)
        .arg("-v")
        .output()
        .await
        .map_err(|source| DisasmError::ToolNotFound {
            command: command.to_string(),
            source,
        })?;

    debug!(
        "Disassembler check: {} -v exited with {}",
        command, output.status
    );
    Ok(())
}

/// Disassembles one file and returns the raw instruction listing.
///
/// The caller passes an already canonicalized path; any non-zero exit
/// status is a per-file `Failure`.
pub async fn disassemble(command: &str, path: &Path) -> Result<String, DisasmError> {
    let output = Command::new(command)
        .args(DISASM_ARGS)
        .arg(path)
        .output()
        .await
        .map_err(|source| DisasmError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(DisasmError::Failure {
            path: path.to_path_buf(),
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_tool_fails() {
        let err = validate_tool("no-such-disassembler-anywhere")
            .await
            .unwrap_err();
        assert!(matches!(err, DisasmError::ToolNotFound { .. }));
        assert!(err.to_string().contains("no-such-disassembler-anywhere"));
    }

    #[tokio::test]
    async fn test_disassemble_with_missing_tool_is_per_file() {
        let err = disassemble("no-such-disassembler-anywhere", Path::new("/bin/ls"))
            .await
            .unwrap_err();
        assert!(matches!(err, DisasmError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_reports_failure() {
        // `false` starts fine but always exits 1, standing in for a
        // disassembler rejecting a non-object file.
        let err = disassemble("false", Path::new("/bin/ls")).await.unwrap_err();
        match err {
            DisasmError::Failure { ref path, .. } => {
                assert_eq!(path, Path::new("/bin/ls"));
            }
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_invocation_captures_stdout() {
        // `echo` used as a stand-in tool: arguments echo back on stdout.
        let listing = disassemble("echo", Path::new("/bin/ls")).await.unwrap();
        assert!(listing.contains("--no-show-raw-insn"));
        assert!(listing.contains("/bin/ls"));
    }
}
