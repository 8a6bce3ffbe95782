//! Compaction: merges every durable table into a single one.
//!
//! Uses [`MergeIterator`] for sorted, deduplicated streaming from all input
//! tables. Because this is a full merge — no older table survives the pass —
//! tombstones have nothing left to shadow and are dropped entirely, which is
//! the moment deleted keys are physically reclaimed.

use anyhow::Result;
use record::Kind;
use sstable::{MergeIterator, TableIterator, TableWriter};
use tracing::{info, warn};

use crate::{files, Engine};

impl Engine {
    /// Compacts all durable tables into one `sstable_<token>_compacted.db`.
    ///
    /// Holds the exclusive engine lock for the whole pass, so no read or
    /// write observes the directory mid-rewrite. With fewer than two tables
    /// there is nothing to merge and the call is a no-op.
    ///
    /// The output is published atomically before any input is deleted; a
    /// crash mid-pass leaves either the old set intact plus ignorable
    /// `temp_` debris, or the new table plus stale inputs that the next
    /// compaction folds in. Neither loses data.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure during merge or output publication.
    pub fn compact(&self) -> Result<()> {
        let _guard = self.write_lock()?;

        let inputs = files::list_tables(&self.config.data_dir)?;
        if inputs.len() < 2 {
            return Ok(());
        }
        info!(inputs = inputs.len(), "compaction started");

        // Chronological order, oldest first: a source's position is its age,
        // which is how the merge knows who wins a duplicate key.
        let mut sources = Vec::with_capacity(inputs.len());
        for path in &inputs {
            sources.push(TableIterator::open(path)?);
        }
        let mut merge = MergeIterator::new(sources);

        let name = files::compacted_table_name()?;
        let out_path = self.config.data_dir.join(&name);
        let mut writer = TableWriter::create(&out_path, self.config.bloom_bytes)?;

        let mut dropped = 0usize;
        while let Some(rec) = merge.next_entry()? {
            match rec.kind {
                Kind::Put => writer.append(Kind::Put, &rec.key, &rec.value)?,
                // No older table outlives a full pass, so the tombstone has
                // nothing to shadow.
                Kind::Delete => dropped += 1,
            }
        }
        let records = writer.record_count();

        // Release input file handles before deleting the files.
        drop(merge);

        writer.finish()?;

        for path in &inputs {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to delete compacted input");
            }
        }

        info!(
            table = %name,
            records,
            tombstones_dropped = dropped,
            "compaction finished"
        );
        Ok(())
    }
}
