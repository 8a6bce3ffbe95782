//! Data-directory naming scheme.
//!
//! Durable tables are named `sstable_<token>.db` (flush output) or
//! `sstable_<token>_compacted.db` (compaction output), where `<token>` is
//! the creation timestamp in nanoseconds, zero-padded to a fixed width so
//! that lexicographic order on names **is** chronological order. Anything
//! prefixed `temp_` is an in-progress artifact and invisible to readers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Prefix reserved for in-progress output files, skipped by all readers.
pub const TEMP_PREFIX: &str = "temp_";

const TABLE_PREFIX: &str = "sstable_";
const TABLE_SUFFIX: &str = ".db";
const COMPACTED_TAG: &str = "_compacted";

/// True for durable table names. `temp_` files fail the prefix test, so
/// they are excluded here without a separate check.
pub(crate) fn is_table_name(name: &str) -> bool {
    name.starts_with(TABLE_PREFIX) && name.ends_with(TABLE_SUFFIX)
}

/// Name for a fresh flush output.
pub(crate) fn flush_table_name() -> Result<String> {
    Ok(format!("{}{:020}{}", TABLE_PREFIX, now_token()?, TABLE_SUFFIX))
}

/// Name for a fresh compaction output.
pub(crate) fn compacted_table_name() -> Result<String> {
    Ok(format!(
        "{}{:020}{}{}",
        TABLE_PREFIX,
        now_token()?,
        COMPACTED_TAG,
        TABLE_SUFFIX
    ))
}

fn now_token() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_nanos())
}

/// Every durable table in `dir`, sorted chronologically (oldest first).
pub(crate) fn list_tables(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read data dir {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| is_table_name(n))
        .collect();

    names.sort();
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Removes leftover `temp_` files from interrupted flushes or compactions.
/// Best-effort: a file that cannot be removed is only logged.
pub(crate) fn cleanup_temp_files(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with(TEMP_PREFIX) {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "failed to remove temp file");
                }
            }
        }
    }
}
