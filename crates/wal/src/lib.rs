//! # WAL — Write-Ahead Log
//!
//! Provides crash-safe durability for the SiltDB storage engine.
//!
//! Every mutation (`PUT` or `DELETE`) is appended to the WAL **before** the
//! corresponding in-memory update. On restart the WAL is replayed to
//! reconstruct the memtable, guaranteeing that no acknowledged write is lost.
//!
//! Records use the shared wire encoding from the [`record`] crate, back to
//! back with no framing. A record half-written at the tail (crash mid-append)
//! is detected by the decoder running out of bytes; replay stops there and
//! the partial tail is discarded.
//!
//! ## Example
//!
//! ```rust,no_run
//! use record::Record;
//! use wal::{Wal, WalReader};
//!
//! let mut w = Wal::open("wal.log", true).unwrap();
//! w.append(&Record::put(b"hello".to_vec(), b"world".to_vec())).unwrap();
//! drop(w);
//!
//! let mut r = WalReader::open("wal.log").unwrap();
//! r.replay(|rec| println!("{:?}", rec)).unwrap();
//! ```

use record::{read_record, write_record, DecodeError, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Append-only WAL writer.
///
/// Each record is serialized into an in-memory buffer and written to the
/// file in a single `write_all` call. When `sync` is `true`, every append is
/// followed by `sync_all()` (fsync) so the record is durable on disk before
/// the call returns; with `sync` off, durability is delegated to the OS page
/// cache.
pub struct Wal {
    file: File,
    sync: bool,
    /// Reusable scratch buffer to avoid allocation on every append.
    buf: Vec<u8>,
}

impl Wal {
    /// Opens (or creates) a WAL file in append mode.
    ///
    /// # Arguments
    ///
    /// * `path` - file system path for the WAL (created if it does not exist).
    /// * `sync` - if true, every `append` call is followed by `fsync`.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self, WalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        Ok(Self {
            file,
            sync,
            buf: Vec::with_capacity(256),
        })
    }

    /// Serializes `record` and appends it to the log.
    ///
    /// The write is all-or-nothing from the caller's perspective: the record
    /// is staged in a buffer first, so a record that fails to encode leaves
    /// the file untouched.
    pub fn append(&mut self, record: &Record) -> Result<(), WalError> {
        self.buf.clear();
        write_record(&mut self.buf, record)?;

        self.file.write_all(&self.buf)?;
        self.file.flush()?;

        if self.sync {
            self.file.sync_all()?;
        }

        Ok(())
    }

    /// Resets the log to empty. Called by the engine once a flush has made
    /// the logged records durable in an SSTable.
    pub fn truncate(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Forces all buffered data to disk via `sync_all()`.
    ///
    /// Useful when `sync` is `false` and the caller wants durability at a
    /// specific point (e.g. a clean shutdown).
    pub fn sync_to_disk(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Sequential WAL reader that yields complete records.
///
/// The reader is generic over any `Read` implementor, allowing it to be used
/// with real files (`WalReader<File>`) or in-memory buffers for testing.
pub struct WalReader<R: Read> {
    rdr: BufReader<R>,
}

impl WalReader<File> {
    /// Opens an existing WAL file for sequential replay.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<WalReader<File>, WalError> {
        let f = File::open(path)?;
        Ok(WalReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> WalReader<R> {
    /// Constructs a reader from any `Read` implementor.
    ///
    /// Useful for unit tests that supply an in-memory buffer (e.g.,
    /// `Cursor<Vec<u8>>`).
    pub fn from_reader(reader: R) -> Self {
        WalReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Replays every complete record in the WAL, calling `apply` for each one
    /// in append order.
    ///
    /// # Termination
    ///
    /// - **Clean EOF** (no bytes left at a record boundary) → `Ok(())`.
    /// - **Truncated or undecodable tail** (crash mid-append) → `Ok(())`
    ///   after yielding every complete record before it; the tail is
    ///   discarded.
    /// - **I/O error** → `Err(WalError::Io(...))`.
    pub fn replay<F>(&mut self, mut apply: F) -> Result<(), WalError>
    where
        F: FnMut(Record),
    {
        loop {
            match read_record(&mut self.rdr) {
                Ok(Some(rec)) => apply(rec),
                Ok(None) => return Ok(()),
                Err(DecodeError::Truncated) | Err(DecodeError::Malformed) => {
                    warn!("wal replay stopped at undecodable tail; discarding partial record");
                    return Ok(());
                }
                Err(DecodeError::Io(e)) => return Err(WalError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests;
