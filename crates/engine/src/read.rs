//! Read path: `get()`.
//!
//! Point lookups check the memtable first (freshest data, tombstones
//! included), then every durable table newest-to-oldest. The first hit
//! wins; a tombstone hit means not-found. That pairing — newest-first plus
//! stop-on-first-hit — is what makes newer writes shadow older ones across
//! tables.

use anyhow::Result;
use record::Kind;
use sstable::search_file;

use crate::{files, Engine};

impl Engine {
    /// Looks up a key, returning its value if present and not deleted.
    ///
    /// Runs under the shared half of the engine lock, so it can proceed in
    /// parallel with other readers but never overlaps a write, flush, or
    /// compaction.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure while listing or reading tables.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let inner = self.read_lock()?;

        // 1. Memtable first, respecting tombstones.
        if let Some(entry) = inner.mem.get(key) {
            return Ok(match entry.kind {
                Kind::Put => Some(entry.value.clone()),
                Kind::Delete => None,
            });
        }

        // 2. Durable tables, newest first. Each lookup opens, scans, and
        // closes the file; `temp_` artifacts never make the list.
        let mut tables = files::list_tables(&self.config.data_dir)?;
        tables.reverse();

        for path in &tables {
            if let Some(entry) = search_file(path, key, self.config.bloom_bytes)? {
                return Ok(match entry.kind {
                    Kind::Put => Some(entry.value),
                    Kind::Delete => None, // tombstone hides older values
                });
            }
        }

        // 3. Not found anywhere.
        Ok(None)
    }
}
