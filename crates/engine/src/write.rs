//! Write path: `put()`, `delete()`, and the inline flush.
//!
//! All mutations flow through here under the exclusive half of the engine
//! lock. Each write is appended to the WAL before the memtable is touched;
//! if the append fails, the operation fails and no in-memory state changes.
//! When the memtable reaches the configured key-count limit the triggering
//! write also performs the flush, still inside its exclusive section.

use anyhow::{ensure, Result};
use memtable::Memtable;
use record::Record;
use sstable::TableWriter;
use tracing::info;

use crate::{files, Engine, Inner, MAX_KEY_SIZE, MAX_VALUE_SIZE};

impl Engine {
    /// Inserts or overwrites a key-value pair.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        ensure!(
            value.len() <= MAX_VALUE_SIZE,
            "value too large: {} bytes (max {})",
            value.len(),
            MAX_VALUE_SIZE
        );
        self.write_record(Record::put(key, value))
    }

    /// Deletes a key by writing a tombstone.
    ///
    /// Deletion is never physical at write time — the tombstone shadows any
    /// older value until a compaction erases both.
    pub fn delete(&self, key: Vec<u8>) -> Result<()> {
        self.write_record(Record::tombstone(key))
    }

    /// The single write protocol shared by `put` and `delete`.
    fn write_record(&self, rec: Record) -> Result<()> {
        ensure!(!rec.key.is_empty(), "key must not be empty");
        ensure!(
            rec.key.len() <= MAX_KEY_SIZE,
            "key too large: {} bytes (max {})",
            rec.key.len(),
            MAX_KEY_SIZE
        );

        let mut inner = self.write_lock()?;

        // WAL first. On failure the memtable is untouched and the caller
        // learns the write is not committed.
        inner.wal.append(&rec)?;
        inner.mem.apply(rec);

        if inner.mem.len() >= self.config.memtable_limit {
            self.flush_locked(&mut inner)?;
        }

        Ok(())
    }

    /// Flushes the current memtable to a new SSTable.
    ///
    /// A no-op on an empty memtable. Exposed for shutdown paths and tests;
    /// the usual trigger is the inline check in [`write_record`].
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.write_lock()?;
        self.flush_locked(&mut inner)
    }

    /// Flush implementation, called with the exclusive lock already held.
    ///
    /// # Steps
    ///
    /// 1. Stream the memtable, in key order, through a [`TableWriter`] into
    ///    `sstable_<token>.db` (written as `temp_`, renamed on success).
    /// 2. Truncate the WAL — its records are now durable in the table.
    /// 3. Replace the memtable with a fresh empty generation.
    pub(crate) fn flush_locked(&self, inner: &mut Inner) -> Result<()> {
        if inner.mem.is_empty() {
            return Ok(());
        }

        let name = files::flush_table_name()?;
        let path = self.config.data_dir.join(&name);

        let mut writer = TableWriter::create(&path, self.config.bloom_bytes)?;
        for (key, entry) in inner.mem.iter() {
            writer.append(entry.kind, key, &entry.value)?;
        }
        let records = writer.record_count();
        writer.finish()?;

        inner.wal.truncate()?;
        inner.mem = Memtable::new();

        info!(table = %name, records, "memtable flushed");
        Ok(())
    }
}
