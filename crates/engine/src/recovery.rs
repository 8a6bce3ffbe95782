//! WAL replay: the cold-start path that rebuilds the memtable from the log.
use anyhow::Result;
use memtable::Memtable;
use std::path::Path;
use wal::{WalError, WalReader};

/// Replays a WAL file into `mem`, returning the number of records applied.
///
/// A missing WAL file is a fresh start, not an error. A truncated tail is
/// handled inside [`WalReader::replay`]: every complete record is applied
/// and the partial one is discarded.
pub fn replay_wal<P: AsRef<Path>>(path: P, mem: &mut Memtable) -> Result<usize> {
    match WalReader::open(path.as_ref()) {
        Ok(mut reader) => {
            let mut applied = 0usize;
            reader.replay(|rec| {
                mem.apply(rec);
                applied += 1;
            })?;
            Ok(applied)
        }
        Err(e) => {
            // File doesn't exist yet -> fresh start
            if matches!(e, WalError::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
            {
                Ok(0)
            } else {
                Err(anyhow::anyhow!(e).context("failed to open WAL for replay"))
            }
        }
    }
}
