use anyhow::{ensure, Context, Result};
use bloom::BloomFilter;
use record::{write_parts, Kind};
use std::fs::{rename, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::format::write_footer;

/// Streaming SSTable writer.
///
/// Records are appended in strictly ascending key order; the writer builds
/// the bloom filter as it goes and lays down the filter bitset and footer on
/// [`finish`](TableWriter::finish).
///
/// The output is written to a `temp_`-prefixed sibling of the target path
/// and renamed into place only after a successful fsync, so readers (which
/// skip the `temp_` prefix) never observe a half-written table. An abandoned
/// temp file is harmless: readers ignore it and the engine removes leftovers
/// at startup.
pub struct TableWriter {
    out: BufWriter<File>,
    filter: BloomFilter,
    tmp_path: PathBuf,
    final_path: PathBuf,
    /// Byte offset of the next record — on finish, the filter offset.
    offset: u64,
    last_key: Option<Vec<u8>>,
    count: usize,
}

impl TableWriter {
    /// Creates a writer targeting `path`, with a filter of `bloom_bytes`.
    pub fn create<P: AsRef<Path>>(path: P, bloom_bytes: usize) -> Result<TableWriter> {
        let final_path = path.as_ref().to_path_buf();
        let file_name = final_path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid table path {}", final_path.display()))?;
        let tmp_path = final_path.with_file_name(format!("temp_{}", file_name));

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;

        Ok(TableWriter {
            out: BufWriter::new(file),
            filter: BloomFilter::new(bloom_bytes),
            tmp_path,
            final_path,
            offset: 0,
            last_key: None,
            count: 0,
        })
    }

    /// Appends one record to the data region and adds its key to the filter.
    ///
    /// Keys must arrive strictly ascending; a repeated or out-of-order key is
    /// an error, keeping the sorted-unique invariant of the file format.
    pub fn append(&mut self, kind: Kind, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some(last) = &self.last_key {
            ensure!(
                key > last.as_slice(),
                "keys must be strictly ascending: {:?} after {:?}",
                key,
                last
            );
        }

        write_parts(&mut self.out, kind, key, value)?;
        self.filter.add(key);
        self.offset += (1 + 4 + 4 + key.len() + value.len()) as u64;
        self.last_key = Some(key.to_vec());
        self.count += 1;
        Ok(())
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.count
    }

    /// Writes the filter bitset and footer, fsyncs, and atomically renames
    /// the table into place.
    pub fn finish(mut self) -> Result<()> {
        self.out.write_all(self.filter.as_bits())?;
        write_footer(&mut self.out, self.offset)?;

        let file = self
            .out
            .into_inner()
            .map_err(|e| e.into_error())
            .context("failed to flush table")?;
        file.sync_all()?;
        drop(file);

        rename(&self.tmp_path, &self.final_path).with_context(|| {
            format!(
                "failed to publish table {} -> {}",
                self.tmp_path.display(),
                self.final_path.display()
            )
        })?;
        Ok(())
    }
}
