//! # Engine - SiltDB Storage Engine
//!
//! The central orchestrator that ties together the [`memtable`], [`wal`], and
//! [`sstable`] crates into a complete LSM-tree key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client handler (one per connection)
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │        RwLock over (memtable, WAL)            │
//! │                                               │
//! │ write.rs → WAL append → Memtable insert       │
//! │              |                                │
//! │              |  (key count >= limit?)         │
//! │              |            yes                 │
//! │              v                                │
//! │       inline flush → new SSTable,             │
//! │       WAL truncated, memtable reset           │
//! │                                               │
//! │ read.rs → Memtable → SSTables newest→oldest   │
//! │            (first match wins)                 │
//! │                                               │
//! │ compaction.rs → k-way merge of every table    │
//! │            into one, tombstones dropped       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module         | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | `lib.rs`       | `Engine` struct, constructor, lock plumbing          |
//! | [`config`]     | injected paths and tunables                          |
//! | [`files`]      | data-directory naming scheme and listing             |
//! | [`recovery`]   | WAL replay, leftover temp-file cleanup               |
//! | [`write`]      | `put()`, `delete()`, inline flush                    |
//! | [`read`]       | `get()`                                              |
//! | [`compaction`] | full-merge `compact()` with tombstone elimination    |
//!
//! ## Crash Safety
//!
//! Every write is appended to the WAL **before** the memtable update, and the
//! WAL is truncated only **after** the flushed table is durably on disk.
//! Tables are published atomically (`temp_` file + rename), so a reader never
//! sees a partial table and an interrupted flush or compaction leaves only
//! discardable `temp_` debris, which startup removes.

mod compaction;
mod config;
mod files;
mod read;
mod recovery;
mod write;

pub use config::Config;
pub use recovery::replay_wal;

use anyhow::{anyhow, ensure, Context, Result};
use memtable::Memtable;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use wal::Wal;

/// Maximum allowed key size in bytes (64 KiB).
pub const MAX_KEY_SIZE: usize = record::MAX_KEY_BYTES;
/// Maximum allowed value size in bytes (10 MiB).
pub const MAX_VALUE_SIZE: usize = record::MAX_VALUE_BYTES;

/// The lock-guarded pair: one memtable generation and its WAL.
///
/// Both are born together and die together at flush time, which is what
/// keeps "everything in the memtable is also in the WAL" true at all times.
pub(crate) struct Inner {
    pub(crate) mem: Memtable,
    pub(crate) wal: Wal,
}

/// The storage engine. Cheap to share across client-handler threads behind
/// an `Arc`; all methods take `&self`.
///
/// # Write Path
///
/// 1. Append the record to the WAL (crash-safe durability).
/// 2. Apply the mutation to the in-memory memtable.
/// 3. If the memtable holds `memtable_limit` distinct keys, flush it to a new
///    SSTable, truncate the WAL, and reset the memtable — all still under the
///    same exclusive lock as the triggering write.
///
/// # Read Path
///
/// 1. Check the memtable (freshest data, includes tombstones).
/// 2. Check SSTables from newest to oldest; first match wins and a tombstone
///    shadows everything older.
///
/// # Recovery
///
/// On [`Engine::open`] the WAL is replayed into a fresh memtable, restoring
/// every committed-but-unflushed write. Durable tables need no recovery —
/// they are immutable and self-describing.
pub struct Engine {
    inner: RwLock<Inner>,
    config: Config,
}

impl Engine {
    /// Opens (or creates) the store described by `config`.
    ///
    /// # Steps
    ///
    /// 1. Create the data directory if absent.
    /// 2. Remove leftover `temp_` files from interrupted flushes/compactions.
    /// 3. Replay the WAL into a fresh memtable.
    /// 4. Open the WAL handle in append mode.
    pub fn open(config: Config) -> Result<Engine> {
        ensure!(config.memtable_limit > 0, "memtable_limit must be > 0");
        ensure!(config.bloom_bytes > 0, "bloom_bytes must be > 0");

        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data dir {}", config.data_dir.display())
        })?;
        files::cleanup_temp_files(&config.data_dir);

        let mut mem = Memtable::new();
        let replayed = replay_wal(&config.wal_path, &mut mem)?;

        let wal = Wal::open(&config.wal_path, config.wal_sync)?;

        info!(
            wal = %config.wal_path.display(),
            data_dir = %config.data_dir.display(),
            memtable_limit = config.memtable_limit,
            replayed,
            "engine started"
        );

        Ok(Engine {
            inner: RwLock::new(Inner { mem, wal }),
            config,
        })
    }

    /// The configuration this engine was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn read_lock(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| anyhow!("engine lock poisoned"))
    }

    pub(crate) fn write_lock(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| anyhow!("engine lock poisoned"))
    }
}

#[cfg(test)]
mod tests;
