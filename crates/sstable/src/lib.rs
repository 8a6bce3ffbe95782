//! # SSTable - Sorted String Table
//!
//! Immutable, on-disk storage files for the SiltDB storage engine.
//!
//! When the in-memory [`memtable::Memtable`] reaches its key-count limit the
//! engine flushes it to disk as an SSTable. SSTables are *write-once,
//! read-many* — once created they are never modified, only replaced during
//! compaction.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ DATA REGION (sorted records, unique keys)                     │
//! │                                                               │
//! │ kind (u8) | key_len (i32 LE) | value_len (i32 LE)             │
//! │ key bytes | value bytes                                       │
//! │                                                               │
//! │ ... repeated for each record ...                              │
//! ├───────────────────────────────────────────────────────────────┤  ← offset F
//! │ FILTER (raw bloom bitset, BLOOM_BYTES bytes)                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FOOTER: F (u64 LE, 8 bytes)                                   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The record encoding is the shared one from the [`record`] crate — the
//! same bytes a WAL holds. The footer is the byte offset where the filter
//! begins, which equals the data-region length. There is no in-file index:
//! point lookups are a filter check followed by a sequential scan of
//! `[0, F)`, so the filter is the sole acceleration for misses.
//!
//! The filter size is a per-deployment configuration value; a reader must be
//! given the same `BLOOM_BYTES` the writer used.

mod format;
mod iter;
mod merge;
mod reader;
mod writer;

pub use format::{footer_pos, read_footer, write_footer, FOOTER_BYTES};
pub use iter::TableIterator;
pub use merge::MergeIterator;
pub use reader::search_file;
pub use writer::TableWriter;

#[cfg(test)]
mod tests;
